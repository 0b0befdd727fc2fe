use crate::terminal::StyleId;

pub(crate) const ASCII_ART: &str = r#"
        ┌─────────────────────────────┐
        │  ╔═╗╔═╗╔╦╗╔═╗╔╦╗            │
        │  ╠╣ ║ ║ ║║║ ║ ║   model     │
        │  ╚  ╚═╝═╩╝╚═╝ ╩   expansion │
        └─────────────────────────────┘
"#;
pub(crate) const STYLE_LOGO: StyleId = 0;
pub(crate) const STYLE_INFO: StyleId = 1;
pub(crate) const STYLE_THEORY: StyleId = 2;
pub(crate) const STYLE_MODEL_HEADER: StyleId = 3;
pub(crate) const STYLE_MODEL_VALUES: StyleId = 4;
pub(crate) const STYLE_ERROR: StyleId = 5;
