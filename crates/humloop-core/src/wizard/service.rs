use super::failure::GenerationFailure;
use super::model::{GenerationMode, GenerationOptions, GenerationResult};
use crate::audio::AudioAsset;
use async_trait::async_trait;

/// The AI generation backend, reached over HTTP in production.
///
/// Implementations must convert every transport or decoding problem into a
/// [`GenerationFailure`]; the wizard never sees raw transport errors.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(
        &self,
        mode: GenerationMode,
        asset: &AudioAsset,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, GenerationFailure>;
}
