// src/browse/mod.rs
pub mod choices;
pub mod sentinels;
pub mod summary;

pub use choices::{
    default_value_columns, reference_selection, row_choices, ChoiceOptions, ReferenceSelection,
    RowChoice, NO_CHOICES_LABEL, NO_VALUE_LABEL,
};
pub use sentinels::{separate_sentinels, SentinelResolution};
pub use summary::{row_summary, ForeignKeyLayout};
