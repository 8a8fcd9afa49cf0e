pub mod lookup;
pub mod normalize;
pub mod quantity;
pub mod types;

pub use lookup::FieldKey;
pub use normalize::{FieldKeys, Normalizer};
pub use quantity::{parse_quantity, parse_quantity_str};
pub use types::{ExtractError, ExtractedRecord, FieldValue, PeriodList, PeriodRecord, NOT_FOUND};
