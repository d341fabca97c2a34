//! Answer-key scoring of submitted applications.
//!
//! - `AnswerKey` / `FieldRule` - what a correct application contains
//! - `QualityReport` - errors, rejection verdict, and over-documentation
//! - `permit_answer_key` - the key shipped with the study

mod answer_key;
mod permit_key;
mod scorer;

pub use answer_key::{AnswerKey, AnswerKeyError, Comparator, FieldRule, Normalization};
pub use permit_key::{permit_answer_key, REQUIRED_DOCUMENTS};
pub use scorer::{OverDocumentation, QualityError, QualityReport};
