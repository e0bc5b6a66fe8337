// Multi-word entries use `_` and are normalized to `-` after generation.

pub const ADJECTIVES: &[&str] = &[
    "ancient",
    "angular",
    "astral",
    "atmospheric",
    "barren",
    "binary",
    "blazing",
    "boreal",
    "brilliant",
    "celestial",
    "cloudy",
    "cold",
    "cosmic",
    "crystalline",
    "dark",
    "distant",
    "dusty",
    "eccentric",
    "electric",
    "elliptical",
    "empirical",
    "equatorial",
    "ethereal",
    "far_flung",
    "frozen",
    "galactic",
    "geocentric",
    "glowing",
    "gravitational",
    "heavenly",
    "infrared",
    "interstellar",
    "ionic",
    "luminous",
    "lunar",
    "magnetic",
    "meteoric",
    "nebular",
    "nuclear",
    "orbital",
    "parabolic",
    "planetary",
    "polar",
    "primal",
    "quantum",
    "radiant",
    "retrograde",
    "rocky",
    "sidereal",
    "solar",
    "sonic",
    "spiral",
    "stellar",
    "supersonic",
    "synchronous",
    "terrestrial",
    "tidal",
    "uncharted",
    "vacant",
    "weightless",
];

pub const NOUNS: &[&str] = &[
    "asteroid",
    "aurora",
    "axis",
    "black_hole",
    "comet",
    "constellation",
    "corona",
    "cosmos",
    "crater",
    "dark_matter",
    "dust",
    "eclipse",
    "equinox",
    "event_horizon",
    "galaxy",
    "gravity",
    "horizon",
    "inclination",
    "ion",
    "magnitude",
    "mass",
    "meteor",
    "meteorite",
    "moon",
    "nebula",
    "neutron",
    "nova",
    "observatory",
    "orbit",
    "parallax",
    "parsec",
    "perihelion",
    "photon",
    "planet",
    "planetoid",
    "pulsar",
    "quasar",
    "radiation",
    "red_dwarf",
    "rocket",
    "satellite",
    "sextant",
    "singularity",
    "solstice",
    "spectrum",
    "star",
    "star_cluster",
    "sun",
    "supernova",
    "telescope",
    "transit",
    "universe",
    "wavelength",
    "white_dwarf",
    "zenith",
];
