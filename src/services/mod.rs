//! External collaborators: place search and path computation.

pub mod geocode;
pub mod rate_limit;
pub mod routing;

pub use geocode::{GeocodeCandidate, Geocoder, NominatimGeocoder, resolve_stops};
pub use rate_limit::RateGate;
pub use routing::{GreatCircleSource, OsrmPathSource, PathSource, RouteTracker};
