//! Tutor registry
//!
//! Static mapping of frontend tutor identifiers to display metadata and the
//! canonical key the backend uses on the wire. Pure lookups, no state.

use std::fmt;

/// Backend key used whenever a frontend id is not recognized
pub const DEFAULT_BACKEND_KEY: &str = "tutor-general";

/// Closed set of tutor personas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TutorId {
    /// General study coach
    Generale,
    /// Mathematics and sciences
    Scientifica,
    /// Literature, history and philosophy
    Umanistica,
}

impl TutorId {
    /// Frontend key for this tutor
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generale => "generale",
            Self::Scientifica => "scientifica",
            Self::Umanistica => "umanistica",
        }
    }

    /// Parse a frontend key (exact match)
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "generale" => Some(Self::Generale),
            "scientifica" => Some(Self::Scientifica),
            "umanistica" => Some(Self::Umanistica),
            _ => None,
        }
    }

    /// Descriptor for this tutor
    pub fn descriptor(&self) -> &'static TutorDescriptor {
        match self {
            Self::Generale => &TUTORS[0],
            Self::Scientifica => &TUTORS[1],
            Self::Umanistica => &TUTORS[2],
        }
    }
}

impl fmt::Display for TutorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque styling handle carried to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualTheme {
    /// CSS-style gradient of the web client, reused by terminal adapters for color choice
    pub gradient: &'static str,
    /// Two-letter avatar initials
    pub icon: &'static str,
    /// Mascot asset path
    pub mascot: &'static str,
}

/// Immutable tutor metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TutorDescriptor {
    /// Frontend identifier
    pub id: TutorId,
    /// Canonical wire key
    pub backend_key: &'static str,
    /// Human-readable name
    pub display_name: &'static str,
    /// Assistant message seeded when no transcript exists
    pub greeting_text: &'static str,
    /// Styling handle
    pub visual_theme: VisualTheme,
}

static TUTORS: [TutorDescriptor; 3] = [
    TutorDescriptor {
        id: TutorId::Generale,
        backend_key: "tutor-general",
        display_name: "Tutor Generale",
        greeting_text: "Ciao! Sono il tuo Tutor Generale. Posso aiutarti con l'organizzazione dello studio, tecniche di apprendimento e motivazione. Come posso supportarti oggi?",
        visual_theme: VisualTheme {
            gradient: "linear-gradient(135deg, #00ff88 0%, #00cc6a 100%)",
            icon: "TG",
            mascot: "/static/assets/images/mascotte_verde.svg",
        },
    },
    TutorDescriptor {
        id: TutorId::Scientifica,
        backend_key: "tutor-scientific",
        display_name: "Tutor Scientifico",
        greeting_text: "Salve! Sono il tuo Tutor per le materie scientifiche. Matematica, fisica, chimica... quale argomento vuoi esplorare?",
        visual_theme: VisualTheme {
            gradient: "linear-gradient(135deg, #00d4ff 0%, #0099cc 100%)",
            icon: "TS",
            mascot: "/static/assets/images/mascotte_blu.svg",
        },
    },
    TutorDescriptor {
        id: TutorId::Umanistica,
        backend_key: "tutor-humanistic",
        display_name: "Tutor Umanistico",
        greeting_text: "Benvenuto! Sono il tuo Tutor per le discipline umanistiche. Letteratura, storia, filosofia... di cosa vuoi parlare?",
        visual_theme: VisualTheme {
            gradient: "linear-gradient(135deg, #ff6b35 0%, #ff4500 100%)",
            icon: "TU",
            mascot: "/static/assets/images/mascotte_arancione.svg",
        },
    },
];

/// All registered tutors in dashboard order
pub fn all() -> &'static [TutorDescriptor] {
    &TUTORS
}

/// Resolve a frontend id to its descriptor
///
/// # Examples
///
/// ```
/// use nodu::tutors;
///
/// assert_eq!(tutors::lookup("scientifica").unwrap().backend_key, "tutor-scientific");
/// assert!(tutors::lookup("astrologia").is_none());
/// ```
pub fn lookup(frontend_id: &str) -> Option<&'static TutorDescriptor> {
    TutorId::parse_str(frontend_id).map(|id| id.descriptor())
}

/// Map a frontend id to its wire key
///
/// Unknown ids fall back to [`DEFAULT_BACKEND_KEY`]; callers that need
/// strictness check [`lookup`] first.
///
/// # Examples
///
/// ```
/// use nodu::tutors;
///
/// assert_eq!(tutors::to_backend_key("umanistica"), "tutor-humanistic");
/// assert_eq!(tutors::to_backend_key("nope"), "tutor-general");
/// ```
pub fn to_backend_key(frontend_id: &str) -> &'static str {
    lookup(frontend_id)
        .map(|d| d.backend_key)
        .unwrap_or(DEFAULT_BACKEND_KEY)
}

/// Map a wire key back to a frontend id, defaulting to the general tutor
pub fn from_backend_key(backend_key: &str) -> TutorId {
    TUTORS
        .iter()
        .find(|d| d.backend_key == backend_key)
        .map(|d| d.id)
        .unwrap_or(TutorId::Generale)
}

/// Closest registered frontend id to a mistyped one, if reasonably close
pub fn suggest(frontend_id: &str) -> Option<&'static str> {
    let needle = frontend_id.to_lowercase();
    TUTORS
        .iter()
        .map(|d| (d.id.as_str(), strsim::jaro_winkler(&needle, d.id.as_str())))
        .filter(|(_, score)| *score >= 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}
