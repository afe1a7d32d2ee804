pub mod credentials;
pub mod stt;
pub mod translate;
pub mod tts;

// Re-export commonly used types for convenience
pub use credentials::GoogleAuthClient;
pub use stt::{
    GoogleRecognizer, RecognitionStream, RecognizerEvent, RecognizerFactory, SttError,
    TranscriptEvent,
};
pub use translate::{OpenAiTranslator, TranslationError, Translator};
pub use tts::{GoogleSynthesizer, SynthesisError, Synthesizer};
