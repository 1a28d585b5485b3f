//! Playlist and cursor.

use crate::error::{PlaybackError, Result};
use bridge_traits::MediaSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One playable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub name: String,
    pub uri: String,
    pub is_video: bool,
}

impl PlaylistEntry {
    pub fn new(name: impl Into<String>, uri: impl Into<String>, is_video: bool) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            is_video,
        }
    }

    pub fn audio(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self::new(name, uri, false)
    }

    pub fn video(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self::new(name, uri, true)
    }

    pub fn source(&self) -> MediaSource {
        MediaSource::new(self.uri.clone(), self.is_video)
    }
}

/// Immutable, non-empty ordered list of entries.
///
/// Cloning is cheap; clones share the same entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    entries: Arc<[PlaylistEntry]>,
}

impl Playlist {
    /// Build a playlist. Fails with [`PlaybackError::EmptyPlaylist`] when
    /// `entries` is empty.
    pub fn new(entries: Vec<PlaylistEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(PlaybackError::EmptyPlaylist);
        }
        Ok(Self {
            entries: entries.into(),
        })
    }

    /// The sample playlist the demo player ships with.
    pub fn builtin() -> Self {
        let entries: Vec<PlaylistEntry> = vec![
            PlaylistEntry::audio(
                "WATER - DOC CHEATHAM & NICHOLAS PAYTON",
                "https://americanroutes.s3.amazonaws.com/shows/9801_01.mp3",
            ),
            PlaylistEntry::audio(
                "WATER - DOC CHEATHAM & NICHOLAS PAYTON",
                "https://americanroutes.s3.amazonaws.com/shows/9801_02.mp3",
            ),
            PlaylistEntry::audio(
                "WATER - DOC CHEATHAM & NICHOLAS PAYTON",
                "https://americanroutes.s3.amazonaws.com/shows/9802_01.mp3",
            ),
            PlaylistEntry::audio(
                "WATER - DOC CHEATHAM & NICHOLAS PAYTON",
                "https://americanroutes.s3.amazonaws.com/shows/9802_02.mp3",
            ),
            PlaylistEntry::audio(
                "Comfort Fit - \u{201c}Sorry\u{201d}",
                "https://s3.amazonaws.com/exp-us-standard/audio/playlist-example/Comfort_Fit_-_03_-_Sorry.mp3",
            ),
            PlaylistEntry::video(
                "Big Buck Bunny",
                "http://d23dyxeqlo5psv.cloudfront.net/big_buck_bunny.mp4",
            ),
            PlaylistEntry::audio(
                "Mildred Bailey \u{2013} \u{201c}All Of Me\u{201d}",
                "https://ia800304.us.archive.org/34/items/PaulWhitemanwithMildredBailey/PaulWhitemanwithMildredBailey-AllofMe.mp3",
            ),
            PlaylistEntry::video(
                "Popeye - I don't scare",
                "https://ia800501.us.archive.org/11/items/popeye_i_dont_scare/popeye_i_dont_scare_512kb.mp4",
            ),
            PlaylistEntry::audio(
                "Podington Bear - \u{201c}Rubber Robot\u{201d}",
                "https://s3.amazonaws.com/exp-us-standard/audio/playlist-example/Podington_Bear_-_Rubber_Robot.mp3",
            ),
        ];

        Self {
            entries: entries.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PlaylistEntry> {
        self.entries.get(index)
    }

    /// Entry under `cursor`. Cursors only come from [`PlaylistCursor::new`]
    /// on this playlist, so the index is always in range.
    pub fn entry_at(&self, cursor: &PlaylistCursor) -> &PlaylistEntry {
        &self.entries[cursor.index() % self.entries.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaylistEntry> {
        self.entries.iter()
    }
}

/// Index into a [`Playlist`] that wraps at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaylistCursor {
    index: usize,
    len: usize,
}

impl PlaylistCursor {
    /// Cursor at the first entry of `playlist`.
    pub fn new(playlist: &Playlist) -> Self {
        Self {
            index: 0,
            len: playlist.len(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Move one step and return the new index. Stepping back from 0 lands on
    /// the last entry; stepping forward from the last lands on 0.
    pub fn advance(&mut self, forward: bool) -> usize {
        let step = if forward { 1 } else { self.len - 1 };
        self.index = (self.index + step) % self.len;
        self.index
    }

    /// Jump to `index`, reduced modulo the playlist length.
    pub fn set(&mut self, index: usize) {
        self.index = index % self.len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(n: usize) -> Playlist {
        Playlist::new(
            (0..n)
                .map(|i| PlaylistEntry::audio(format!("track {i}"), format!("file:///{i}.mp3")))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn empty_playlist_is_rejected() {
        assert!(matches!(Playlist::new(Vec::new()), Err(PlaybackError::EmptyPlaylist)));
    }

    #[test]
    fn builtin_playlist_has_nine_entries() {
        let builtin = Playlist::builtin();
        assert_eq!(builtin.len(), 9);
        assert_eq!(builtin.iter().filter(|e| e.is_video).count(), 2);
        assert_eq!(builtin.get(5).unwrap().name, "Big Buck Bunny");
    }

    #[test]
    fn advance_wraps_at_both_ends() {
        let list = playlist(4);
        let mut cursor = PlaylistCursor::new(&list);

        assert_eq!(cursor.advance(false), 3);
        assert_eq!(cursor.advance(true), 0);

        cursor.set(3);
        assert_eq!(cursor.advance(true), 0);
    }

    #[test]
    fn forward_then_back_restores_every_index() {
        for n in 1..=5 {
            let list = playlist(n);
            for start in 0..n {
                let mut cursor = PlaylistCursor::new(&list);
                cursor.set(start);

                cursor.advance(true);
                cursor.advance(false);
                assert_eq!(cursor.index(), start, "n={n} forward/back");

                cursor.advance(false);
                cursor.advance(true);
                assert_eq!(cursor.index(), start, "n={n} back/forward");
            }
        }
    }

    #[test]
    fn single_entry_playlist_stays_put() {
        let list = playlist(1);
        let mut cursor = PlaylistCursor::new(&list);
        assert_eq!(cursor.advance(true), 0);
        assert_eq!(cursor.advance(false), 0);
    }
}
