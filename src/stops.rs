//! The ordered list of named stops a trip visits.

use std::fmt::Write as _;

use crate::foundation::core::LngLat;

/// Stable identity of a stop within its list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(u64);

#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub coord: Option<LngLat>,
    pub is_geocoding: bool,
}

/// Partial update applied by [`StopList::update`]; `None` fields are left alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StopPatch {
    pub name: Option<String>,
    pub coord: Option<Option<LngLat>>,
    pub is_geocoding: Option<bool>,
}

/// Never fewer than two stops.
#[derive(Clone, Debug, PartialEq)]
pub struct StopList {
    next_id: u64,
    stops: Vec<Stop>,
}

impl Default for StopList {
    fn default() -> Self {
        Self::new()
    }
}

impl StopList {
    pub const MIN_STOPS: usize = 2;

    /// Two empty stops.
    pub fn new() -> Self {
        let mut list = Self {
            next_id: 1,
            stops: Vec::new(),
        };
        list.add();
        list.add();
        list
    }

    /// Build from `(name, coord)` pairs, padding with empty stops up to two.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Option<LngLat>)>) -> Self {
        let mut list = Self {
            next_id: 1,
            stops: Vec::new(),
        };
        for (name, coord) in entries {
            let id = list.add();
            list.update(
                id,
                StopPatch {
                    name: Some(name),
                    coord: Some(coord),
                    is_geocoding: None,
                },
            );
        }
        while list.stops.len() < Self::MIN_STOPS {
            list.add();
        }
        list
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn get(&self, id: StopId) -> Option<&Stop> {
        self.stops.iter().find(|s| s.id == id)
    }

    /// Append an empty stop.
    pub fn add(&mut self) -> StopId {
        let id = StopId(self.next_id);
        self.next_id += 1;
        self.stops.push(Stop {
            id,
            name: String::new(),
            coord: None,
            is_geocoding: false,
        });
        id
    }

    /// Remove a stop; refused while only two remain.
    pub fn remove(&mut self, id: StopId) -> bool {
        if self.stops.len() <= Self::MIN_STOPS {
            return false;
        }
        let before = self.stops.len();
        self.stops.retain(|s| s.id != id);
        before != self.stops.len()
    }

    /// Apply `patch` to the stop `id`. Returns `false` for an unknown id.
    pub fn update(&mut self, id: StopId, patch: StopPatch) -> bool {
        let Some(stop) = self.stops.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        if let Some(name) = patch.name {
            stop.name = name;
        }
        if let Some(coord) = patch.coord {
            stop.coord = coord;
        }
        if let Some(flag) = patch.is_geocoding {
            stop.is_geocoding = flag;
        }
        true
    }

    /// Typing a new name invalidates the resolved coordinate.
    pub fn rename(&mut self, id: StopId, name: impl Into<String>) -> bool {
        self.update(
            id,
            StopPatch {
                name: Some(name.into()),
                coord: Some(None),
                is_geocoding: None,
            },
        )
    }

    /// Move the stop at `from` to index `to`. Out-of-range indices leave the list unchanged.
    pub fn move_stop(&mut self, from: usize, to: usize) -> bool {
        if from >= self.stops.len() || to >= self.stops.len() {
            return false;
        }
        let moved = self.stops.remove(from);
        self.stops.insert(to, moved);
        true
    }

    /// Coordinates of resolved stops, in list order.
    pub fn resolved_coords(&self) -> Vec<LngLat> {
        self.stops.iter().filter_map(|s| s.coord).collect()
    }

    /// Identifies the resolved coordinate sequence; unchanged keys mean the path is still valid.
    pub fn coord_key(&self) -> String {
        let mut key = String::new();
        for (i, c) in self.resolved_coords().iter().enumerate() {
            if i > 0 {
                key.push(';');
            }
            let _ = write!(key, "{:.6},{:.6}", c.lon, c.lat);
        }
        key
    }
}

#[cfg(test)]
#[path = "../tests/unit/stops/stops.rs"]
mod tests;
