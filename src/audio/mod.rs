#[cfg(feature = "audio")]
pub mod chime;
#[cfg(feature = "audio")]
mod engine;

#[cfg(feature = "audio")]
pub use engine::RodioToneGenerator;

use std::sync::Arc;

use log::{debug, info};

use crate::config::AppConfig;
use crate::timer::ToneKind;

/// Plays audible cues. Implementations must not block the caller and must
/// swallow their own failures.
pub trait ToneGenerator: Send + Sync {
    fn emit(&self, kind: ToneKind);
}

pub struct SilentToneGenerator;

impl ToneGenerator for SilentToneGenerator {
    fn emit(&self, kind: ToneKind) {
        debug!("cue {} (muted)", kind.as_str());
    }
}

pub fn tone_generator(config: &AppConfig) -> Arc<dyn ToneGenerator> {
    if config.mute {
        info!("Audio cues muted");
        return Arc::new(SilentToneGenerator);
    }

    #[cfg(feature = "audio")]
    {
        Arc::new(RodioToneGenerator::new())
    }

    #[cfg(not(feature = "audio"))]
    {
        info!("Built without the `audio` feature; cues are logged only");
        Arc::new(SilentToneGenerator)
    }
}
