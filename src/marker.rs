//!
//! Frame markers: per-frame sound and sprite annotations.
//!

use bimap::BiMap;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::base::YukeError;

/// Sound id meaning "no sound".
pub const SOUND_NONE: u8 = 0xC3;

/// Sprite id meaning "no sprite".
pub const SPRITE_NONE: u8 = 0;

/// Known sound event ids. Ids above `0xD0` are believed to be environmental sounds.
///
/// `0xCD` plays the same sound as `0xCC`, `0xCE` and `0xCF` the same as `0xCB`.
/// They are listed under the name of that sound followed by their id, which
/// keeps every name unique for `sound_id`.
pub const SOUND_IDS: [(u8, &str); 14] = [
    (0xC3, "No Sound"),
    (0xC4, "Slap"),
    (0xC5, "Strike Punch"),
    (0xC6, "Punch/Kick"),
    (0xC7, "UNK1"),
    (0xC8, "UNK2"),
    (0xC9, "UNK3"),
    (0xCA, "Strong Kick"),
    (0xCB, "Aerial Miss Slam"),
    (0xCC, "Forceful Slam onto Canvas"),
    (0xCD, "Forceful Slam onto Canvas (CD)"),
    (0xCE, "Aerial Miss Slam (CE)"),
    (0xCF, "Aerial Miss Slam (CF)"),
    (0xD0, "Forceful Slam 2"),
];

/// Known sprite ids (hand gestures, facial expressions).
pub const SPRITE_IDS: [(u8, &str); 2] = [(SPRITE_NONE, "None"), (1, "Sprite 1")];

fn sound_table() -> &'static BiMap<u8, &'static str> {
    static TABLE: OnceLock<BiMap<u8, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| SOUND_IDS.iter().copied().collect())
}

/// Gets the name of a known sound id.
pub fn sound_name(id: u8) -> Option<&'static str> {
    sound_table().get_by_left(&id).copied()
}

/// Gets the id of a known sound name.
pub fn sound_id(name: &str) -> Option<u8> {
    sound_table().get_by_right(name).copied()
}

/// Gets the name of a known sprite id.
pub fn sprite_name(id: u8) -> Option<&'static str> {
    SPRITE_IDS.iter().find(|(sprite, _)| *sprite == id).map(|(_, name)| *name)
}

/// A marker attached to one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "rkyv", derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerEntry {
    pub frame: i32,
    pub sound_id: u8,
    pub sprite_id: u8,
}

impl MarkerEntry {
    /// Creates a new `MarkerEntry`.
    #[inline]
    pub fn new(frame: i32, sound_id: u8, sprite_id: u8) -> MarkerEntry {
        MarkerEntry {
            frame,
            sound_id,
            sprite_id,
        }
    }

    /// Creates a marker with no sound and no sprite.
    #[inline]
    pub fn blank(frame: i32) -> MarkerEntry {
        MarkerEntry::new(frame, SOUND_NONE, SPRITE_NONE)
    }
}

///
/// Authoring-side marker collection, at most one marker per frame.
///
/// The encoder trusts that a frame carries zero or one marker; this type is
/// where that rule is enforced.
///
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerTrack {
    markers: BTreeMap<i32, MarkerEntry>,
}

impl MarkerTrack {
    pub fn new() -> MarkerTrack {
        MarkerTrack::default()
    }

    /// Adds a blank marker on `frame`.
    pub fn add(&mut self, frame: i32) -> Result<&mut MarkerEntry, YukeError> {
        self.insert(MarkerEntry::blank(frame))
    }

    /// Inserts a marker, rejecting a second marker on the same frame.
    pub fn insert(&mut self, entry: MarkerEntry) -> Result<&mut MarkerEntry, YukeError> {
        use std::collections::btree_map::Entry;
        match self.markers.entry(entry.frame) {
            Entry::Occupied(_) => Err(YukeError::DuplicateMarker(entry.frame)),
            Entry::Vacant(slot) => Ok(slot.insert(entry)),
        }
    }

    /// Removes the marker on `frame`.
    pub fn remove(&mut self, frame: i32) -> Result<MarkerEntry, YukeError> {
        self.markers.remove(&frame).ok_or(YukeError::MarkerNotFound(frame))
    }

    /// Gets the marker on `frame`.
    #[inline]
    pub fn get(&self, frame: i32) -> Option<&MarkerEntry> {
        self.markers.get(&frame)
    }

    /// Gets the marker on `frame` for editing.
    #[inline]
    pub fn get_mut(&mut self, frame: i32) -> Option<&mut MarkerEntry> {
        self.markers.get_mut(&frame)
    }

    /// Markers ordered by frame.
    pub fn iter(&self) -> impl Iterator<Item = &MarkerEntry> {
        self.markers.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
