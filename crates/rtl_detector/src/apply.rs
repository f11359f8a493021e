//! Writes a direction back to the document.

use log::warn;

use crate::classify::Direction;
use crate::config::DetectorConfig;
use crate::document::DocumentHandle;
use crate::error::DirectionError;

/// Apply `direction` to the whole document.
///
/// Sets `dir` on the root element, points the RTL stylesheet link at the
/// configured URL (or clears it) and swaps the body marker classes. Each write
/// is attempted even when an earlier hook is missing. Applying the same
/// direction twice leaves the document unchanged.
///
/// # Errors
/// Returns the first hook that could not be written.
pub fn apply_text_direction<D: DocumentHandle + ?Sized>(
    document: &mut D,
    direction: Direction,
    config: &DetectorConfig,
) -> Result<(), DirectionError> {
    let (href, add, remove) = match direction {
        Direction::Rtl => (
            config.rtl_stylesheet_url.as_str(),
            config.rtl_class.as_str(),
            config.ltr_class.as_str(),
        ),
        Direction::Ltr => ("", config.ltr_class.as_str(), config.rtl_class.as_str()),
    };

    let results = [
        document.set_root_attribute("dir", direction.as_str()),
        document.set_link_href(&config.stylesheet_link_id, href),
        document.swap_body_class(add, remove),
    ];

    let mut first_error = None;
    for err in results.into_iter().filter_map(Result::err) {
        warn!("could not apply {direction} direction: {err}");
        first_error.get_or_insert(err);
    }
    first_error.map_or(Ok(()), Err)
}
