//! Body selectors and physical disc sizes.

use std::fmt;

/// Astronomical unit in km (IAU 2012).
pub const AU_KM: f64 = 149_597_870.7;

/// Solar system bodies and computed points the provider can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    MeanNode,
    TrueNode,
    MeanApogee,
    OsculatingApogee,
}

impl Body {
    /// All variants, in declaration order.
    pub const ALL: [Body; 14] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
        Body::MeanNode,
        Body::TrueNode,
        Body::MeanApogee,
        Body::OsculatingApogee,
    ];

    /// Mean equatorial diameter in km. Computed points have no disc.
    pub const fn diameter_km(self) -> f64 {
        match self {
            Self::Sun => 1_392_000.0,
            Self::Moon => 3_476.3,
            Self::Mercury => 4_879.4,
            Self::Venus => 12_103.6,
            Self::Mars => 6_779.0,
            Self::Jupiter => 139_822.0,
            Self::Saturn => 116_464.0,
            Self::Uranus => 50_724.0,
            Self::Neptune => 49_244.0,
            Self::Pluto => 2_376.6,
            Self::MeanNode | Self::TrueNode | Self::MeanApogee | Self::OsculatingApogee => 0.0,
        }
    }

    /// Lunar nodes and apogees: mathematical points, not physical bodies.
    pub const fn is_computed_point(self) -> bool {
        matches!(
            self,
            Self::MeanNode | Self::TrueNode | Self::MeanApogee | Self::OsculatingApogee
        )
    }

    /// Conventional distance for fixed-size discs in rise/set work.
    pub const fn mean_distance_km(self) -> Option<f64> {
        match self {
            Self::Sun => Some(AU_KM),
            Self::Moon => Some(0.00257 * AU_KM),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Sun => "Sun",
            Self::Moon => "Moon",
            Self::Mercury => "Mercury",
            Self::Venus => "Venus",
            Self::Mars => "Mars",
            Self::Jupiter => "Jupiter",
            Self::Saturn => "Saturn",
            Self::Uranus => "Uranus",
            Self::Neptune => "Neptune",
            Self::Pluto => "Pluto",
            Self::MeanNode => "mean node",
            Self::TrueNode => "true node",
            Self::MeanApogee => "mean apogee",
            Self::OsculatingApogee => "osculating apogee",
        }
    }
}

/// What a position request, eclipse or occultation refers to.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Target {
    Body(Body),
    /// Numbered minor planet with a caller-supplied diameter.
    MinorPlanet { number: u32, diameter_km: f64 },
    /// Fixed star, by catalog name. Stars are treated as point sources.
    Star(String),
}

impl Target {
    pub fn star(name: impl Into<String>) -> Self {
        Self::Star(name.into())
    }

    /// Disc diameter in km; zero for stars and computed points.
    pub fn diameter_km(&self) -> f64 {
        match self {
            Self::Body(b) => b.diameter_km(),
            Self::MinorPlanet { diameter_km, .. } => *diameter_km,
            Self::Star(_) => 0.0,
        }
    }

    pub fn radius_km(&self) -> f64 {
        self.diameter_km() / 2.0
    }

    pub fn is_body(&self, body: Body) -> bool {
        matches!(self, Self::Body(b) if *b == body)
    }

    pub fn is_star(&self) -> bool {
        matches!(self, Self::Star(_))
    }

    pub fn is_computed_point(&self) -> bool {
        matches!(self, Self::Body(b) if b.is_computed_point())
    }

    pub fn mean_distance_km(&self) -> Option<f64> {
        match self {
            Self::Body(b) => b.mean_distance_km(),
            _ => None,
        }
    }
}

impl From<Body> for Target {
    fn from(body: Body) -> Self {
        Self::Body(body)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body(b) => f.write_str(b.name()),
            Self::MinorPlanet { number, .. } => write!(f, "minor planet {number}"),
            Self::Star(name) => write!(f, "star {name}"),
        }
    }
}
