//! Catalog of named output sizes.
//!
//! The same fixed list the size picker offers: common device screens plus a
//! handful of social-media formats. Each preset is addressed by a stable
//! slug (`desktop-large`) so it can be used from config files and the CLI.

use crate::imaging::{AspectRatio, TargetSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub slug: &'static str,
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
}

impl Preset {
    pub fn target(&self) -> TargetSize {
        TargetSize::new(self.width, self.height)
    }

    pub fn aspect(&self) -> AspectRatio {
        AspectRatio::of(self.target())
    }
}

const fn preset(slug: &'static str, label: &'static str, width: u32, height: u32) -> Preset {
    Preset {
        slug,
        label,
        width,
        height,
    }
}

pub const PRESETS: &[Preset] = &[
    preset("mobile-small", "Mobile Small", 320, 480),
    preset("mobile-medium", "Mobile Medium", 375, 667),
    preset("mobile-large", "Mobile Large", 414, 736),
    preset("desktop-small", "Desktop Small", 1366, 768),
    preset("desktop-medium", "Desktop Medium", 1440, 900),
    preset("desktop-large", "Desktop Large", 1920, 1080),
    preset("desktop-ultrawide", "Desktop Ultra-Wide", 2560, 1080),
    preset("desktop-4k", "Desktop 4K", 3840, 2160),
    preset("thumbnail", "Thumbnail", 150, 150),
    preset("banner", "Banner", 1200, 300),
    preset("facebook-cover", "Facebook Cover", 820, 312),
    preset("instagram-post", "Instagram Post", 1080, 1080),
    preset("instagram-story", "Instagram Story", 1080, 1920),
    preset("twitter-post", "Twitter Post", 1024, 512),
];

/// Look up a preset by slug (case-insensitive).
pub fn find_preset(slug: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.slug.eq_ignore_ascii_case(slug.trim()))
}
