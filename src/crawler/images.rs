//! Decides whether an `<img>` in a feed entry is content or page chrome.

/// Substrings that mark avatars and other profile chrome.
pub const PROFILE_INDICATORS: [&str; 7] = [
    "profile_pic",
    "profile-pic",
    "avatar",
    "profile",
    "/p/",
    "_pp_",
    "profile_image",
];

/// Images smaller than this in either dimension are treated as icons.
pub const MIN_DIMENSION: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageVerdict {
    Keep,
    MissingSource,
    ProfileChrome,
    TooSmall,
}

/// Classify a candidate image from its raw attributes.
///
/// Absent or unparseable dimensions never count as small.
pub fn classify(
    src: Option<&str>,
    alt: Option<&str>,
    width: Option<&str>,
    height: Option<&str>,
) -> ImageVerdict {
    let src = match src.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return ImageVerdict::MissingSource,
    };
    let src = src.to_lowercase();
    let alt = alt.unwrap_or_default().to_lowercase();

    let flagged = PROFILE_INDICATORS
        .iter()
        .any(|indicator| src.contains(indicator) || alt.contains(indicator));
    if flagged || alt.contains("profile") || alt == "avatar" {
        return ImageVerdict::ProfileChrome;
    }

    if is_small(width) || is_small(height) {
        return ImageVerdict::TooSmall;
    }

    ImageVerdict::Keep
}

pub fn is_content_image(
    src: Option<&str>,
    alt: Option<&str>,
    width: Option<&str>,
    height: Option<&str>,
) -> bool {
    classify(src, alt, width, height) == ImageVerdict::Keep
}

fn is_small(dimension: Option<&str>) -> bool {
    match dimension.and_then(|d| d.trim().parse::<u32>().ok()) {
        Some(px) => px > 0 && px < MIN_DIMENSION,
        None => false,
    }
}
