//! Validation utilities for the Tomato Ripeness Management Service

// ============================================================================
// Image Filename Validations
// ============================================================================

/// Reduce a client-supplied filename to its final path component.
///
/// Returns `None` for names that have no usable component ("", ".", "..",
/// trailing separators). The result never contains a path separator, so it is
/// safe to join under the predictions directory.
pub fn safe_image_filename(name: &str) -> Option<&str> {
    let component = name
        .rsplit(['/', '\\'])
        .next()
        .filter(|c| !c.is_empty() && *c != "." && *c != "..")?;

    Some(component)
}

/// Validate a filename used to look up a stored image.
///
/// Unlike upload handling, lookups do not sanitize: the name must already be
/// a bare component or the request is rejected.
pub fn validate_image_filename(name: &str) -> Result<(), &'static str> {
    match safe_image_filename(name) {
        Some(component) if component == name => Ok(()),
        _ => Err("Filename must be a bare path component"),
    }
}

// ============================================================================
// Detector Configuration Validations
// ============================================================================

/// Validate a detector confidence threshold is in [0, 1]
pub fn validate_confidence_threshold(threshold: f32) -> Result<(), &'static str> {
    if !threshold.is_finite() {
        return Err("Confidence threshold must be a finite number");
    }
    if !(0.0..=1.0).contains(&threshold) {
        return Err("Confidence threshold must be between 0 and 1");
    }
    Ok(())
}

/// Validate a detector class list is usable for catalog construction.
///
/// Catalog positions map to stages in groups of three, so the list must
/// contain complete cultivars: a trailing partial triple would classify as a
/// stray ripe or half-ripe class.
pub fn validate_class_names(names: &[String]) -> Result<(), &'static str> {
    if names.is_empty() {
        return Err("Class list must not be empty");
    }
    if names.len() % 3 != 0 {
        return Err("Class list must contain three stages per cultivar");
    }
    if names.iter().any(|n| n.trim().is_empty()) {
        return Err("Class names must not be blank");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Image Filename Validation Tests
    // ========================================================================

    #[test]
    fn test_safe_image_filename_plain() {
        assert_eq!(safe_image_filename("tomato.jpg"), Some("tomato.jpg"));
        assert_eq!(safe_image_filename("row-3_cam2.png"), Some("row-3_cam2.png"));
    }

    #[test]
    fn test_safe_image_filename_strips_directories() {
        assert_eq!(safe_image_filename("uploads/tomato.jpg"), Some("tomato.jpg"));
        assert_eq!(safe_image_filename("../../etc/passwd"), Some("passwd"));
        assert_eq!(safe_image_filename("C:\\photos\\t.png"), Some("t.png"));
    }

    #[test]
    fn test_safe_image_filename_rejects_unusable() {
        assert_eq!(safe_image_filename(""), None);
        assert_eq!(safe_image_filename("."), None);
        assert_eq!(safe_image_filename(".."), None);
        assert_eq!(safe_image_filename("photos/"), None); // Trailing separator
        assert_eq!(safe_image_filename("a/.."), None);
    }

    #[test]
    fn test_validate_image_filename_valid() {
        assert!(validate_image_filename("tomato.jpg").is_ok());
        assert!(validate_image_filename("annotated_tomato.jpg").is_ok());
    }

    #[test]
    fn test_validate_image_filename_invalid() {
        assert!(validate_image_filename("uploads/tomato.jpg").is_err());
        assert!(validate_image_filename("..").is_err());
        assert!(validate_image_filename("").is_err());
        assert!(validate_image_filename("a\\b.jpg").is_err());
    }

    // ========================================================================
    // Detector Configuration Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_confidence_threshold_valid() {
        assert!(validate_confidence_threshold(0.0).is_ok());
        assert!(validate_confidence_threshold(0.5).is_ok());
        assert!(validate_confidence_threshold(1.0).is_ok());
    }

    #[test]
    fn test_validate_confidence_threshold_invalid() {
        assert!(validate_confidence_threshold(-0.1).is_err());
        assert!(validate_confidence_threshold(1.1).is_err());
        assert!(validate_confidence_threshold(f32::NAN).is_err());
    }

    #[test]
    fn test_validate_class_names_valid() {
        let names: Vec<String> = crate::models::DEFAULT_CLASS_NAMES
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert!(validate_class_names(&names).is_ok());
    }

    #[test]
    fn test_validate_class_names_invalid() {
        assert!(validate_class_names(&[]).is_err());
        let blank: Vec<String> = ["ok", "  ", "also"].iter().map(|n| n.to_string()).collect();
        assert!(validate_class_names(&blank).is_err());
    }

    #[test]
    fn test_validate_class_names_rejects_partial_cultivars() {
        let mut names: Vec<String> = ["cherry_red", "cherry_turning", "cherry_green"]
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert!(validate_class_names(&names).is_ok());

        // A fourth entry would sit alone at position 0 of a new triple
        names.push("cherry_overripe".to_string());
        assert!(validate_class_names(&names).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Sanitized filenames never contain a path separator
            #[test]
            fn sanitized_names_have_no_separators(name in ".{0,64}") {
                if let Some(component) = safe_image_filename(&name) {
                    prop_assert!(!component.contains('/'));
                    prop_assert!(!component.contains('\\'));
                    prop_assert!(!component.is_empty());
                }
            }

            /// Validation accepts exactly the names sanitization leaves alone
            #[test]
            fn validation_matches_sanitization(name in "[a-zA-Z0-9._/\\\\-]{1,32}") {
                let valid = validate_image_filename(&name).is_ok();
                let unchanged = safe_image_filename(&name) == Some(name.as_str());
                prop_assert_eq!(valid, unchanged);
            }
        }
    }
}
