//! Section document types.
//!
//! A section is a set of common fields plus exactly one [`SectionPayload`]
//! variant. Fields owned by other content types cannot be represented, so a
//! type switch always discards the previous type's data.

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::choice::define_choice_enum;
use crate::section::registry;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Choice enums
// ---------------------------------------------------------------------------

define_choice_enum! {
    /// Content kind of a section. Determines which payload fields apply.
    SectionType ("section type") {
        Text => "text",
        KeyValue => "key-value",
        Image => "image",
        Card => "card",
        Hero => "hero",
        FeaturesGrid => "features-grid",
        Stats => "stats",
        CtaSection => "cta-section",
        ProcessSteps => "process-steps",
        Testimonial => "testimonial",
        Gallery => "gallery",
        Video => "video",
        Accordion => "accordion",
        Timeline => "timeline",
        Pricing => "pricing",
        Team => "team",
        ContactForm => "contact-form",
        Newsletter => "newsletter",
        SocialLinks => "social-links",
        CustomHtml => "custom-html",
        BannerCarousel => "banner-carousel",
    }
}

define_choice_enum! {
    ContainerWidth ("containerWidth") {
        Full => "full",
        Contained => "contained",
        Narrow => "narrow",
    }
}

define_choice_enum! {
    Padding ("padding") {
        None => "none",
        Small => "small",
        Normal => "normal",
        Large => "large",
    }
}

define_choice_enum! {
    Background ("background") {
        Transparent => "transparent",
        White => "white",
        Gray => "gray",
        Gradient1 => "gradient-1",
        Gradient2 => "gradient-2",
        Custom => "custom",
    }
}

define_choice_enum! {
    TextAlign ("textAlign") {
        Left => "left",
        Center => "center",
        Right => "right",
    }
}

define_choice_enum! {
    Gap ("gap") {
        Small => "small",
        Normal => "normal",
        Large => "large",
    }
}

define_choice_enum! {
    TitleSize ("titleSize") {
        H1 => "h1",
        H2 => "h2",
        H3 => "h3",
        H4 => "h4",
        H5 => "h5",
        H6 => "h6",
    }
}

define_choice_enum! {
    FontFamily ("fontFamily") {
        Default => "default",
        Serif => "serif",
        Mono => "mono",
    }
}

define_choice_enum! {
    ButtonStyle ("button style") {
        Primary => "primary",
        Secondary => "secondary",
        Outline => "outline",
        Ghost => "ghost",
    }
}

define_choice_enum! {
    VideoPlatform ("videoPlatform") {
        Youtube => "youtube",
        Vimeo => "vimeo",
        Custom => "custom",
    }
}

define_choice_enum! {
    AnimationKind ("animation type") {
        FadeIn => "fadeIn",
        FadeOut => "fadeOut",
        SlideUp => "slideUp",
        SlideDown => "slideDown",
        SlideLeft => "slideLeft",
        SlideRight => "slideRight",
        ZoomIn => "zoomIn",
        ZoomOut => "zoomOut",
        None => "none",
    }
}

define_choice_enum! {
    DeviceType ("deviceType") {
        All => "all",
        Desktop => "desktop",
        Mobile => "mobile",
        Tablet => "tablet",
    }
}

macro_rules! choice_default {
    ($($name:ident => $variant:ident),+ $(,)?) => {
        $(
            impl Default for $name {
                fn default() -> Self {
                    Self::$variant
                }
            }
        )+
    };
}

choice_default! {
    ContainerWidth => Contained,
    Padding => Normal,
    Background => Transparent,
    TextAlign => Left,
    Gap => Normal,
    TitleSize => H2,
    FontFamily => Default,
    ButtonStyle => Primary,
    VideoPlatform => Youtube,
    AnimationKind => FadeIn,
    DeviceType => All,
}

// ---------------------------------------------------------------------------
// Sub-objects (always present on a stored section)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Layout {
    pub container_width: ContainerWidth,
    pub padding: Padding,
    pub background: Background,
    pub custom_background: String,
    pub text_align: TextAlign,
    /// Grid columns, 1 to 4.
    pub columns: u8,
    pub gap: Gap,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            container_width: ContainerWidth::default(),
            padding: Padding::default(),
            background: Background::default(),
            custom_background: String::new(),
            text_align: TextAlign::default(),
            columns: 1,
            gap: Gap::default(),
        }
    }
}

pub const DEFAULT_TITLE_COLOR: &str = "#003C69";
pub const DEFAULT_CONTENT_COLOR: &str = "#333333";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Typography {
    pub title_size: TitleSize,
    pub title_color: String,
    pub content_color: String,
    pub font_family: FontFamily,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            title_size: TitleSize::default(),
            title_color: DEFAULT_TITLE_COLOR.to_string(),
            content_color: DEFAULT_CONTENT_COLOR.to_string(),
            font_family: FontFamily::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Animation {
    pub enabled: bool,
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    /// Milliseconds before the animation starts.
    pub delay: u32,
    /// Milliseconds.
    pub duration: u32,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: AnimationKind::default(),
            delay: 0,
            duration: 500,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayConditions {
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub user_roles: Vec<String>,
    pub device_type: DeviceType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Seo {
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
}

// ---------------------------------------------------------------------------
// Payload item types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroButton {
    pub text: String,
    pub link: String,
    pub style: ButtonStyle,
    pub external: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Feature {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub link: String,
    pub link_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stat {
    pub number: String,
    pub label: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessStep {
    /// Display label such as `"01"` or `"Step A"`.
    pub step_number: Option<String>,
    pub title: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GalleryImage {
    pub url: String,
    pub alt: String,
    pub caption: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccordionItem {
    pub title: String,
    pub content: String,
    pub default_open: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineItem {
    pub date: String,
    pub title: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarouselBanner {
    pub image: String,
    pub title: String,
    pub subtitle: String,
    pub link: String,
    pub button_text: String,
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Type-specific data of a section, tagged by its `type`.
///
/// Serializes as `{"type": "<tag>", ...owned fields}` with camelCase field
/// names, matching the flat wire document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum SectionPayload {
    Text,
    KeyValue,
    Image,
    Card {
        #[serde(default)]
        card_button_text: String,
        #[serde(default)]
        card_button_link: String,
        #[serde(default)]
        card_button_style: ButtonStyle,
    },
    Hero {
        #[serde(default)]
        hero_subtitle: String,
        #[serde(default)]
        hero_image: String,
        #[serde(default)]
        hero_buttons: Vec<HeroButton>,
    },
    FeaturesGrid {
        #[serde(default)]
        features: Vec<Feature>,
    },
    Stats {
        #[serde(default)]
        stats: Vec<Stat>,
    },
    CtaSection,
    ProcessSteps {
        #[serde(default)]
        steps: Vec<ProcessStep>,
    },
    Testimonial,
    Gallery {
        #[serde(default)]
        images: Vec<GalleryImage>,
    },
    Video {
        #[serde(default)]
        video_url: String,
        #[serde(default)]
        video_thumbnail: String,
        #[serde(default)]
        video_platform: VideoPlatform,
    },
    Accordion {
        #[serde(default)]
        accordion_items: Vec<AccordionItem>,
    },
    Timeline {
        #[serde(default)]
        timeline_items: Vec<TimelineItem>,
    },
    Pricing,
    Team,
    ContactForm,
    Newsletter,
    SocialLinks,
    CustomHtml,
    BannerCarousel {
        #[serde(default)]
        banners: Vec<CarouselBanner>,
    },
}

impl SectionPayload {
    pub fn section_type(&self) -> SectionType {
        match self {
            Self::Text => SectionType::Text,
            Self::KeyValue => SectionType::KeyValue,
            Self::Image => SectionType::Image,
            Self::Card { .. } => SectionType::Card,
            Self::Hero { .. } => SectionType::Hero,
            Self::FeaturesGrid { .. } => SectionType::FeaturesGrid,
            Self::Stats { .. } => SectionType::Stats,
            Self::CtaSection => SectionType::CtaSection,
            Self::ProcessSteps { .. } => SectionType::ProcessSteps,
            Self::Testimonial => SectionType::Testimonial,
            Self::Gallery { .. } => SectionType::Gallery,
            Self::Video { .. } => SectionType::Video,
            Self::Accordion { .. } => SectionType::Accordion,
            Self::Timeline { .. } => SectionType::Timeline,
            Self::Pricing => SectionType::Pricing,
            Self::Team => SectionType::Team,
            Self::ContactForm => SectionType::ContactForm,
            Self::Newsletter => SectionType::Newsletter,
            Self::SocialLinks => SectionType::SocialLinks,
            Self::CustomHtml => SectionType::CustomHtml,
            Self::BannerCarousel { .. } => SectionType::BannerCarousel,
        }
    }

    /// Owned fields of this payload as a flat camelCase map, without the
    /// `type` tag.
    pub fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(mut map) => {
                map.remove("type");
                Ok(map)
            }
            _ => Ok(Map::new()),
        }
    }

    /// Build a payload of the given type from a flat field map. Fields not
    /// owned by `section_type` are ignored; missing fields take defaults.
    pub fn from_fields(
        section_type: SectionType,
        mut fields: Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        fields.insert(
            "type".to_string(),
            Value::String(section_type.as_str().to_string()),
        );
        serde_json::from_value(Value::Object(fields))
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// A fully normalized section ready to be written. `section_index` is `None`
/// when the store should assign the next free index.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalSection {
    pub section_index: Option<i32>,
    pub title: String,
    pub content: String,
    pub payload: SectionPayload,
    pub layout: Layout,
    pub typography: Typography,
    pub animation: Animation,
    pub display_conditions: DisplayConditions,
    pub seo: Seo,
    pub is_visible: bool,
    pub custom_css: String,
    pub custom_js: String,
    pub updated_at: Timestamp,
}

/// A stored section.
///
/// Serializes to the flat wire document: common fields, every payload field
/// of every type (zero-valued unless owned by the active type), and the
/// always-present sub-objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: DbId,
    pub section_index: i32,
    pub title: String,
    pub content: String,
    pub payload: SectionPayload,
    pub layout: Layout,
    pub typography: Typography,
    pub animation: Animation,
    pub display_conditions: DisplayConditions,
    pub seo: Seo,
    pub is_visible: bool,
    pub custom_css: String,
    pub custom_js: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Section {
    pub fn section_type(&self) -> SectionType {
        self.payload.section_type()
    }

    /// Render the flat JSON document returned to clients.
    pub fn to_document(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let mut doc = Map::new();
        doc.insert("id".into(), Value::from(self.id));
        doc.insert("sectionIndex".into(), Value::from(self.section_index));
        doc.insert("title".into(), Value::from(self.title.as_str()));
        doc.insert("content".into(), Value::from(self.content.as_str()));
        doc.insert("type".into(), Value::from(self.section_type().as_str()));

        for (name, zero) in registry::all_payload_fields() {
            doc.insert(name.to_string(), zero);
        }
        doc.extend(self.payload.to_fields()?);

        doc.insert("layout".into(), serde_json::to_value(&self.layout)?);
        doc.insert("typography".into(), serde_json::to_value(&self.typography)?);
        doc.insert("animation".into(), serde_json::to_value(&self.animation)?);
        doc.insert(
            "displayConditions".into(),
            serde_json::to_value(&self.display_conditions)?,
        );
        doc.insert("seo".into(), serde_json::to_value(&self.seo)?);
        doc.insert("isVisible".into(), Value::from(self.is_visible));
        doc.insert("customCSS".into(), Value::from(self.custom_css.as_str()));
        doc.insert("customJS".into(), Value::from(self.custom_js.as_str()));
        doc.insert("createdAt".into(), serde_json::to_value(self.created_at)?);
        doc.insert("updatedAt".into(), serde_json::to_value(self.updated_at)?);
        Ok(doc)
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}
