use super::*;

#[test]
fn webm_args_carry_codec_and_bitrate() {
    let args = container_args(ContainerFormat::WebmVp9, 5_000_000).unwrap();
    let joined = args.join(" ");
    assert!(joined.contains("-c:v libvpx-vp9"));
    assert!(joined.contains("-b:v 5000000"));
    assert!(joined.ends_with("-f webm"));
}

#[test]
fn mp4_output_is_fragmented_for_piping() {
    let args = container_args(ContainerFormat::Mp4H264, 1_000).unwrap();
    assert!(args.iter().any(|a| a.contains("empty_moov")));
    assert_eq!(args.last().map(String::as_str), Some("mp4"));
}

#[test]
fn y4m_is_not_an_ffmpeg_format() {
    assert!(container_args(ContainerFormat::Y4m, 0).is_err());
}
