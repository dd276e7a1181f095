/// Built-in artwork, density table and converter defaults

pub mod artwork {
    /// Retro camera launcher icon, 512x512 design grid.
    /// Written to disk verbatim so every run hands converters identical bytes.
    pub const ICON_SVG: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg width="512" height="512" xmlns="http://www.w3.org/2000/svg">
  <!-- Background - soft cream -->
  <rect width="512" height="512" fill="#F4F1DE" rx="80"/>

  <!-- Camera body - vintage orange -->
  <rect x="106" y="156" width="300" height="200" rx="20" fill="#E07A5F"/>

  <!-- Lens - deep taupe circle -->
  <circle cx="256" cy="256" r="80" fill="#3D405B"/>
  <circle cx="256" cy="256" r="60" fill="#81B29A" opacity="0.3"/>
  <circle cx="256" cy="256" r="40" fill="#3D405B"/>

  <!-- Viewfinder - top left -->
  <rect x="136" y="136" width="60" height="40" rx="8" fill="#3D405B"/>

  <!-- Flash - top right -->
  <rect x="316" y="136" width="60" height="40" rx="8" fill="#F2CC8F"/>

  <!-- Shutter button - top -->
  <circle cx="366" cy="186" r="16" fill="#E29578"/>

  <!-- Wordmark -->
  <text x="256" y="420" font-family="serif" font-size="56" font-weight="bold"
        text-anchor="middle" fill="#3D405B" letter-spacing="4">reis</text>
</svg>"##;

    /// File name used for the intermediate SVG
    pub const SVG_FILE_NAME: &str = "reis_icon.svg";
}

pub mod density {
    /// Android launcher densities and their square pixel size, smallest first
    pub const MIPMAP_TARGETS: [(&str, u32); 5] = [
        ("mipmap-mdpi", 48),
        ("mipmap-hdpi", 72),
        ("mipmap-xhdpi", 96),
        ("mipmap-xxhdpi", 144),
        ("mipmap-xxxhdpi", 192),
    ];

    /// Name of the raster written inside each density directory
    pub const OUTPUT_FILE_NAME: &str = "ic_launcher.png";

    /// Output root, relative to the project the icon belongs to
    pub const DEFAULT_RES_DIR: &str = "android/app/src/main/res";
}

pub mod converters {
    /// Converters in priority order (best quality first)
    pub const PRIORITY: [&str; 3] = [RSVG_CONVERT, IMAGEMAGICK, QUICKLOOK];

    pub const RSVG_CONVERT: &str = "rsvg-convert";
    pub const IMAGEMAGICK: &str = "convert";
    pub const QUICKLOOK: &str = "qlmanage";

    /// Quick Look can hang on headless machines; it is the only bounded call
    pub const QUICKLOOK_TIMEOUT_SECS: u64 = 10;

    /// How often a bounded child is polled for exit
    pub const POLL_INTERVAL_MS: u64 = 50;
}
