use log::debug;

use crate::apply::apply_text_direction;
use crate::classify::Direction;
use crate::config::DetectorConfig;
use crate::document::DocumentHandle;
use crate::error::DirectionError;
use crate::language::current_language;

/// Read the current language, classify it and apply the resulting direction.
///
/// Nothing is cached between calls; every call recomputes and re-applies.
///
/// # Errors
/// Propagates [`apply_text_direction`] failures.
pub fn update_text_direction<D: DocumentHandle + ?Sized>(
    document: &mut D,
    config: &DetectorConfig,
) -> Result<Direction, DirectionError> {
    let (language, source) = current_language(document, config);
    let direction = Direction::of_language(&language);
    debug!("language {language:?} from {source:?} -> {direction}");
    apply_text_direction(document, direction, config)?;
    Ok(direction)
}
