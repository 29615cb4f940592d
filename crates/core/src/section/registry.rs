//! Static table of which payload fields belong to which section type.
//!
//! Adding a content type means adding a [`SectionType`] variant, a
//! [`SectionPayload`](super::types::SectionPayload) variant, and one
//! [`TypeFields`] entry below.

use serde_json::Value;

use super::types::{
    AnimationKind, Background, ButtonStyle, ContainerWidth, DeviceType, FontFamily, Gap,
    Padding, SectionType, TextAlign, TitleSize, VideoPlatform,
};

/// How a single incoming value is checked and coerced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// Loose string; `null` becomes `""`.
    Text,
    /// Loose boolean (`"true"`, `1`, ...).
    Bool,
    /// Integer within an inclusive range.
    Int { min: i64, max: i64 },
    /// One of a fixed set of strings.
    Choice(&'static [&'static str]),
    /// List of strings; a comma-separated string is split.
    TextList,
    /// RFC 3339 timestamp or `null`.
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rule: Rule,
}

const fn field(name: &'static str, rule: Rule) -> FieldSpec {
    FieldSpec { name, rule }
}

/// A list-of-objects field owned by a section type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayField {
    pub name: &'static str,
    /// Keys every entry must carry with a non-empty value.
    pub item_required: &'static [FieldSpec],
    pub item_optional: &'static [FieldSpec],
}

/// Layout values a type starts with when no layout is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutDefaults {
    pub background: Option<Background>,
    pub columns: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeFields {
    pub section_type: SectionType,
    /// Scalar fields that must be non-empty while this type is active.
    pub required: &'static [FieldSpec],
    pub optional: &'static [FieldSpec],
    pub array_field: Option<ArrayField>,
    pub layout_defaults: LayoutDefaults,
}

impl TypeFields {
    /// Whether `name` is a payload field owned by this type.
    pub fn owns(&self, name: &str) -> bool {
        self.required
            .iter()
            .chain(self.optional)
            .any(|f| f.name == name)
            || self.array_field.is_some_and(|a| a.name == name)
    }
}

const NO_LAYOUT_DEFAULTS: LayoutDefaults = LayoutDefaults {
    background: None,
    columns: None,
};

const fn bare(section_type: SectionType) -> TypeFields {
    TypeFields {
        section_type,
        required: &[],
        optional: &[],
        array_field: None,
        layout_defaults: NO_LAYOUT_DEFAULTS,
    }
}

/// One entry per [`SectionType`], in declaration order.
static REGISTRY: [TypeFields; 21] = [
    bare(SectionType::Text),
    bare(SectionType::KeyValue),
    bare(SectionType::Image),
    TypeFields {
        section_type: SectionType::Card,
        required: &[
            field("cardButtonText", Rule::Text),
            field("cardButtonLink", Rule::Text),
        ],
        optional: &[field("cardButtonStyle", Rule::Choice(ButtonStyle::VALUES))],
        array_field: None,
        layout_defaults: NO_LAYOUT_DEFAULTS,
    },
    TypeFields {
        section_type: SectionType::Hero,
        required: &[],
        optional: &[
            field("heroSubtitle", Rule::Text),
            field("heroImage", Rule::Text),
        ],
        array_field: Some(ArrayField {
            name: "heroButtons",
            item_required: &[field("text", Rule::Text), field("link", Rule::Text)],
            item_optional: &[
                field("style", Rule::Choice(ButtonStyle::VALUES)),
                field("external", Rule::Bool),
            ],
        }),
        layout_defaults: LayoutDefaults {
            background: Some(Background::Gradient1),
            columns: None,
        },
    },
    TypeFields {
        section_type: SectionType::FeaturesGrid,
        required: &[],
        optional: &[],
        array_field: Some(ArrayField {
            name: "features",
            item_required: &[field("title", Rule::Text), field("description", Rule::Text)],
            item_optional: &[
                field("icon", Rule::Text),
                field("link", Rule::Text),
                field("linkText", Rule::Text),
            ],
        }),
        layout_defaults: LayoutDefaults {
            background: None,
            columns: Some(3),
        },
    },
    TypeFields {
        section_type: SectionType::Stats,
        required: &[],
        optional: &[],
        array_field: Some(ArrayField {
            name: "stats",
            item_required: &[field("number", Rule::Text), field("label", Rule::Text)],
            item_optional: &[field("description", Rule::Text), field("color", Rule::Text)],
        }),
        layout_defaults: NO_LAYOUT_DEFAULTS,
    },
    bare(SectionType::CtaSection),
    TypeFields {
        section_type: SectionType::ProcessSteps,
        required: &[],
        optional: &[],
        array_field: Some(ArrayField {
            name: "steps",
            item_required: &[field("title", Rule::Text)],
            item_optional: &[
                field("stepNumber", Rule::Text),
                field("description", Rule::Text),
                field("icon", Rule::Text),
            ],
        }),
        layout_defaults: NO_LAYOUT_DEFAULTS,
    },
    bare(SectionType::Testimonial),
    TypeFields {
        section_type: SectionType::Gallery,
        required: &[],
        optional: &[],
        array_field: Some(ArrayField {
            name: "images",
            item_required: &[field("url", Rule::Text)],
            item_optional: &[
                field("alt", Rule::Text),
                field("caption", Rule::Text),
                field("link", Rule::Text),
            ],
        }),
        layout_defaults: NO_LAYOUT_DEFAULTS,
    },
    TypeFields {
        section_type: SectionType::Video,
        required: &[field("videoUrl", Rule::Text)],
        optional: &[
            field("videoThumbnail", Rule::Text),
            field("videoPlatform", Rule::Choice(VideoPlatform::VALUES)),
        ],
        array_field: None,
        layout_defaults: NO_LAYOUT_DEFAULTS,
    },
    TypeFields {
        section_type: SectionType::Accordion,
        required: &[],
        optional: &[],
        array_field: Some(ArrayField {
            name: "accordionItems",
            item_required: &[field("title", Rule::Text)],
            item_optional: &[field("content", Rule::Text), field("defaultOpen", Rule::Bool)],
        }),
        layout_defaults: NO_LAYOUT_DEFAULTS,
    },
    TypeFields {
        section_type: SectionType::Timeline,
        required: &[],
        optional: &[],
        array_field: Some(ArrayField {
            name: "timelineItems",
            item_required: &[field("title", Rule::Text)],
            item_optional: &[
                field("date", Rule::Text),
                field("description", Rule::Text),
                field("image", Rule::Text),
            ],
        }),
        layout_defaults: NO_LAYOUT_DEFAULTS,
    },
    bare(SectionType::Pricing),
    bare(SectionType::Team),
    bare(SectionType::ContactForm),
    bare(SectionType::Newsletter),
    bare(SectionType::SocialLinks),
    bare(SectionType::CustomHtml),
    TypeFields {
        section_type: SectionType::BannerCarousel,
        required: &[],
        optional: &[],
        array_field: Some(ArrayField {
            name: "banners",
            item_required: &[field("image", Rule::Text)],
            item_optional: &[
                field("title", Rule::Text),
                field("subtitle", Rule::Text),
                field("link", Rule::Text),
                field("buttonText", Rule::Text),
            ],
        }),
        layout_defaults: NO_LAYOUT_DEFAULTS,
    },
];

/// Look up the field table for a section type.
pub fn fields_for(section_type: SectionType) -> &'static TypeFields {
    &REGISTRY[section_type as usize]
}

/// Every payload field across all types, paired with its zero value
/// (`""` for scalars, `[]` for lists).
pub fn all_payload_fields() -> impl Iterator<Item = (&'static str, Value)> {
    REGISTRY.iter().flat_map(|entry| {
        let scalars = entry
            .required
            .iter()
            .chain(entry.optional)
            .map(|f| (f.name, Value::String(String::new())));
        let list = entry
            .array_field
            .map(|a| (a.name, Value::Array(Vec::new())));
        scalars.chain(list)
    })
}

// ---------------------------------------------------------------------------
// Sub-object field tables
// ---------------------------------------------------------------------------

pub const LAYOUT_FIELDS: &[FieldSpec] = &[
    field("containerWidth", Rule::Choice(ContainerWidth::VALUES)),
    field("padding", Rule::Choice(Padding::VALUES)),
    field("background", Rule::Choice(Background::VALUES)),
    field("customBackground", Rule::Text),
    field("textAlign", Rule::Choice(TextAlign::VALUES)),
    field("columns", Rule::Int { min: 1, max: 4 }),
    field("gap", Rule::Choice(Gap::VALUES)),
];

pub const TYPOGRAPHY_FIELDS: &[FieldSpec] = &[
    field("titleSize", Rule::Choice(TitleSize::VALUES)),
    field("titleColor", Rule::Text),
    field("contentColor", Rule::Text),
    field("fontFamily", Rule::Choice(FontFamily::VALUES)),
];

pub const ANIMATION_FIELDS: &[FieldSpec] = &[
    field("enabled", Rule::Bool),
    field("type", Rule::Choice(AnimationKind::VALUES)),
    field("delay", Rule::Int { min: 0, max: 60_000 }),
    field("duration", Rule::Int { min: 0, max: 60_000 }),
];

pub const DISPLAY_CONDITION_FIELDS: &[FieldSpec] = &[
    field("startDate", Rule::Timestamp),
    field("endDate", Rule::Timestamp),
    field("userRoles", Rule::TextList),
    field("deviceType", Rule::Choice(DeviceType::VALUES)),
];

pub const SEO_FIELDS: &[FieldSpec] = &[
    field("metaTitle", Rule::Text),
    field("metaDescription", Rule::Text),
    field("keywords", Rule::TextList),
];

/// Sub-objects in wire order, with their field tables.
pub const SUB_OBJECTS: &[(&str, &[FieldSpec])] = &[
    ("layout", LAYOUT_FIELDS),
    ("typography", TYPOGRAPHY_FIELDS),
    ("animation", ANIMATION_FIELDS),
    ("displayConditions", DISPLAY_CONDITION_FIELDS),
    ("seo", SEO_FIELDS),
];
