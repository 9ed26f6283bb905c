//! Image URL clean-up shared by listings and SKUs.

/// Trims an image URL and gives protocol-relative URLs (`//img...`) an
/// explicit `https:` scheme.
#[must_use]
pub fn cook_image(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("//") {
        format!("https:{trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// Splits a comma-separated URL list and cooks every entry. Blank entries are
/// kept; [`distinct_images`] drops them.
#[must_use]
pub fn split_images(raw: &str) -> Vec<String> {
    raw.split(',').map(cook_image).collect()
}

/// Drops blank entries and repeats, keeping first-seen order.
#[must_use]
pub fn distinct_images<I, S>(images: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for image in images {
        let image = image.as_ref();
        if image.trim().is_empty() || out.iter().any(|seen| seen == image) {
            continue;
        }
        out.push(image.to_string());
    }
    out
}
