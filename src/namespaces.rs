//! IRI constants for the vocabularies the output graph uses.

use oxigraph::model::NamedNode;

macro_rules! n {
    ($iri:expr) => {
        oxigraph::model::NamedNodeRef::new_unchecked($iri)
    };
}

type N = oxigraph::model::NamedNodeRef<'static>;

pub use oxigraph::model::vocab::{rdf, rdfs, xsd};

/// Feature namespaces the converted entities are minted in.
pub const TENEMENTS: &str = "https://linked.data.gov.au/dataset/gsq-tenements/";
pub const QLDBORES: &str = "https://linked.data.gov.au/dataset/gsq-bores/";
pub const SAMPLES: &str = "https://linked.data.gov.au/dataset/gsq-samples/";
pub const DEFAULT_DATASET_NAMESPACE: &str = "http://example.com/dataset/";

/// Prefixes bound when serializing to a syntax that supports them.
pub const PREFIXES: &[(&str, &str)] = &[
    ("bore", "https://linked.data.gov.au/def/bore/"),
    ("ex", "http://example.com/"),
    ("geo", "http://www.opengis.net/ont/geosparql#"),
    ("geosample", "https://linked.data.gov.au/def/geosample/"),
    ("minroles", "https://linked.data.gov.au/def/mining-roles/"),
    ("minten", "https://linked.data.gov.au/def/mining-tenements/"),
    ("prov", "http://www.w3.org/ns/prov#"),
    ("qldbores", QLDBORES),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("samples", SAMPLES),
    ("schema", "https://schema.org/"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("sosa", "http://www.w3.org/ns/sosa/"),
    ("tenements", TENEMENTS),
    ("time", "http://www.w3.org/2006/time#"),
    ("unit", "http://qudt.org/vocab/unit/"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
];

pub mod skos {
    use super::N;

    pub const CONCEPT: N = n!("http://www.w3.org/2004/02/skos/core#Concept");
    pub const CONCEPT_SCHEME: N = n!("http://www.w3.org/2004/02/skos/core#ConceptScheme");
    pub const COLLECTION: N = n!("http://www.w3.org/2004/02/skos/core#Collection");
    pub const NOTATION: N = n!("http://www.w3.org/2004/02/skos/core#notation");
    pub const PREF_LABEL: N = n!("http://www.w3.org/2004/02/skos/core#prefLabel");
    pub const DEFINITION: N = n!("http://www.w3.org/2004/02/skos/core#definition");
    pub const IN_SCHEME: N = n!("http://www.w3.org/2004/02/skos/core#inScheme");
    pub const MEMBER: N = n!("http://www.w3.org/2004/02/skos/core#member");
    pub const HAS_TOP_CONCEPT: N = n!("http://www.w3.org/2004/02/skos/core#hasTopConcept");
    pub const TOP_CONCEPT_OF: N = n!("http://www.w3.org/2004/02/skos/core#topConceptOf");
    pub const EXACT_MATCH: N = n!("http://www.w3.org/2004/02/skos/core#exactMatch");
}

pub mod sosa {
    use super::N;

    pub const SAMPLE: N = n!("http://www.w3.org/ns/sosa/Sample");
    pub const FEATURE_OF_INTEREST: N = n!("http://www.w3.org/ns/sosa/FeatureOfInterest");
    pub const OBSERVATION: N = n!("http://www.w3.org/ns/sosa/Observation");
    pub const OBSERVATION_COLLECTION: N = n!("http://www.w3.org/ns/sosa/ObservationCollection");
    pub const HAS_MEMBER: N = n!("http://www.w3.org/ns/sosa/hasMember");
    pub const HAS_FEATURE_OF_INTEREST: N = n!("http://www.w3.org/ns/sosa/hasFeatureOfInterest");
    pub const HAS_RESULT: N = n!("http://www.w3.org/ns/sosa/hasResult");
    pub const OBSERVED_PROPERTY: N = n!("http://www.w3.org/ns/sosa/observedProperty");
    pub const USED_PROCEDURE: N = n!("http://www.w3.org/ns/sosa/usedProcedure");
    pub const MADE_BY_SENSOR: N = n!("http://www.w3.org/ns/sosa/madeBySensor");
    pub const IS_SAMPLE_OF: N = n!("http://www.w3.org/ns/sosa/isSampleOf");
    pub const RESULT_TIME: N = n!("http://www.w3.org/ns/sosa/resultTime");
    pub const PROCEDURE: N = n!("http://www.w3.org/ns/sosa/Procedure");
    pub const SAMPLING: N = n!("http://www.w3.org/ns/sosa/Sampling");
}

pub mod prov {
    use super::N;

    pub const AGENT_CLASS: N = n!("http://www.w3.org/ns/prov#Agent");
    pub const AGENT: N = n!("http://www.w3.org/ns/prov#agent");
    pub const QUALIFIED_ATTRIBUTION: N = n!("http://www.w3.org/ns/prov#qualifiedAttribution");
    pub const HAD_ROLE: N = n!("http://www.w3.org/ns/prov#hadRole");
    pub const STARTED_AT_TIME: N = n!("http://www.w3.org/ns/prov#startedAtTime");
    pub const ENDED_AT_TIME: N = n!("http://www.w3.org/ns/prov#endedAtTime");
}

pub mod sdo {
    use super::N;

    pub const DATASET: N = n!("https://schema.org/Dataset");
    pub const ORGANIZATION: N = n!("https://schema.org/Organization");
    pub const NAME: N = n!("https://schema.org/name");
    pub const DESCRIPTION: N = n!("https://schema.org/description");
    pub const DATE_CREATED: N = n!("https://schema.org/dateCreated");
    pub const DATE_MODIFIED: N = n!("https://schema.org/dateModified");
    pub const DATE_RECEIVED: N = n!("https://schema.org/dateReceived");
    pub const CREATOR: N = n!("https://schema.org/creator");
    pub const HAS_PART: N = n!("https://schema.org/hasPart");
    pub const ADDITIONAL_TYPE: N = n!("https://schema.org/additionalType");
    pub const LOCATION: N = n!("https://schema.org/location");
    pub const IDENTIFIER: N = n!("https://schema.org/identifier");
    pub const VALUE: N = n!("https://schema.org/value");
    pub const UNIT_CODE: N = n!("https://schema.org/unitCode");
    pub const MARGIN_OF_ERROR: N = n!("https://schema.org/marginOfError");
    pub const MIN_VALUE: N = n!("https://schema.org/minValue");
    pub const MAX_VALUE: N = n!("https://schema.org/maxValue");
    pub const DEPTH: N = n!("https://schema.org/depth");
}

pub mod geo {
    use super::N;

    pub const FEATURE: N = n!("http://www.opengis.net/ont/geosparql#Feature");
    pub const GEOMETRY: N = n!("http://www.opengis.net/ont/geosparql#Geometry");
    pub const HAS_GEOMETRY: N = n!("http://www.opengis.net/ont/geosparql#hasGeometry");
    pub const AS_WKT: N = n!("http://www.opengis.net/ont/geosparql#asWKT");
    pub const WKT_LITERAL: N = n!("http://www.opengis.net/ont/geosparql#wktLiteral");
}

pub mod time {
    use super::N;

    pub const INSTANT: N = n!("http://www.w3.org/2006/time#Instant");
    pub const HAS_TIME: N = n!("http://www.w3.org/2006/time#hasTime");
    pub const IN_XSD_DATE: N = n!("http://www.w3.org/2006/time#inXSDDate");
}

pub mod bore {
    use super::N;

    pub const BORE: N = n!("https://linked.data.gov.au/def/bore/Bore");
    pub const SURVEY: N = n!("https://linked.data.gov.au/def/bore/Survey");
    pub const DRILLING_TIME: N = n!("https://linked.data.gov.au/def/bore/DrillingTime");
    pub const BOREHOLE_INTERVAL: N = n!("https://linked.data.gov.au/def/bore/BoreholeInterval");
    pub const HAD_DRILLING_METHOD: N = n!("https://linked.data.gov.au/def/bore/hadDrillingMethod");
    pub const HAD_SURVEY: N = n!("https://linked.data.gov.au/def/bore/hadSurvey");
    pub const HAS_DIAMETER: N = n!("https://linked.data.gov.au/def/bore/hasDiameter");
    pub const HAS_DIP: N = n!("https://linked.data.gov.au/def/bore/hasDip");
    pub const HAS_AZIMUTH: N = n!("https://linked.data.gov.au/def/bore/hasAzimuth");
    pub const HAS_PURPOSE: N = n!("https://linked.data.gov.au/def/bore/hasPurpose");
    pub const HAS_TOTAL_DEPTH: N = n!("https://linked.data.gov.au/def/bore/hasTotalDepth");
    pub const HAS_TOTAL_DEPTH_LOGGER: N =
        n!("https://linked.data.gov.au/def/bore/hasTotalDepthLogger");
    pub const HAS_ALPHA_ANGLE: N = n!("https://linked.data.gov.au/def/bore/hasAlphaAngle");
    pub const HAS_BETA_ANGLE: N = n!("https://linked.data.gov.au/def/bore/hasBetaAngle");
    pub const HAS_DIP_DIRECTION: N = n!("https://linked.data.gov.au/def/bore/hasDipDirection");
}

pub mod tenement {
    use super::N;

    pub const TENEMENT: N = n!("https://linked.data.gov.au/def/mining-tenements/Tenement");
    pub const TENEMENT_AREA: N = n!("https://linked.data.gov.au/def/mining-tenements/TenementArea");
    pub const MAP_SHEET: N = n!("https://linked.data.gov.au/def/mining-tenements/MapSheet");
    pub const HAS_PROJECT: N = n!("https://linked.data.gov.au/def/mining-tenements/hasProject");
}

pub mod roles {
    use super::N;

    pub const TENEMENT_HOLDER: N = n!("https://linked.data.gov.au/def/mining-roles/TenementHolder");
    pub const TENEMENT_OPERATOR: N =
        n!("https://linked.data.gov.au/def/mining-roles/TenementOperator");
    pub const SURVEYER: N = n!("https://linked.data.gov.au/def/mining-roles/Surveyer");
    pub const DRILLER: N = n!("https://linked.data.gov.au/def/mining-roles/Driller");
    pub const SAMPLE_ANALYSER: N = n!("https://linked.data.gov.au/def/mining-roles/SampleAnalyser");
}

pub mod geosample {
    use super::N;

    pub const MATERIAL: N = n!("https://linked.data.gov.au/def/geosample/material");
    pub const WEATHERING: N = n!("https://linked.data.gov.au/def/geosample/weathering");
    pub const COLOUR: N = n!("https://linked.data.gov.au/def/geosample/colour");
    pub const STRUCTURE: N = n!("https://linked.data.gov.au/def/geosample/structure");
    pub const TEXTURE: N = n!("https://linked.data.gov.au/def/geosample/texture");
    pub const GRAIN_SIZE: N = n!("https://linked.data.gov.au/def/geosample/grainSize");
}

pub mod units {
    use super::N;

    pub const M: N = n!("http://qudt.org/vocab/unit/M");
    pub const DEG: N = n!("http://qudt.org/vocab/unit/DEG");
    pub const NANO_T: N = n!("http://qudt.org/vocab/unit/NanoT");
    pub const PERCENT: N = n!("http://qudt.org/vocab/unit/PERCENT");
    pub const PH: N = n!("http://qudt.org/vocab/unit/PH");
    pub const UNITLESS: N = n!("http://qudt.org/vocab/unit/UNITLESS");
}

/// Ad hoc predicates with no published home yet.
pub mod ex {
    use super::N;

    pub const LOCATION_SURVEY_TYPE: N = n!("http://example.com/locationSurveyType");
    pub const PRE_COLLAR_METHOD: N = n!("http://example.com/preCollarMethod");
    pub const PRE_COLLAR_DEPTH: N = n!("http://example.com/preCollarDepth");
    pub const HAS_MAGNETIC_FIELD_STRENGTH: N = n!("http://example.com/hasMagneticFieldStrength");
    pub const SAMPLE_TYPE: N = n!("http://example.com/sampleType");
    pub const MESH_SIZE: N = n!("http://example.com/meshSize");
    pub const SOIL_PH: N = n!("http://example.com/soilPh");
    pub const SAMPLE_DEPTH: N = n!("http://example.com/sampleDepth");
    pub const SPECIFIC_GRAVITY: N = n!("http://example.com/specificGravity");
    pub const MAGNETIC_SUSCEPTIBILITY: N = n!("http://example.com/magneticSusceptibility");
    pub const INSTRUMENT_TYPE: N = n!("http://example.com/instrumentType");
    pub const COLLECTION_DATE: N = n!("http://example.com/collectionDate");
    pub const DISPATCH_DATE: N = n!("http://example.com/dispatchDate");
    pub const FROM_DEPTH: N = n!("http://example.com/fromDepth");
    pub const TO_DEPTH: N = n!("http://example.com/toDepth");
    pub const DETECTION_LIMIT: N = n!("http://example.com/detectionLimit");
    pub const UPPER_DETECTION_LIMIT: N = n!("http://example.com/upperDetectionLimit");
    pub const ACCURACY: N = n!("http://example.com/accuracy");
    pub const PRECISION: N = n!("http://example.com/precision");
    pub const CENSORED: N = n!("http://example.com/censored");
    pub const QAQC_TYPE: N = n!("http://example.com/qaqcType");
    pub const ASSAY: N = n!("http://example.com/assay");
    pub const PREPARATION: N = n!("http://example.com/preparation");
    pub const ROCK_TYPE: N = n!("http://example.com/rockType");
    pub const MINERAL: N = n!("http://example.com/mineral");
    pub const MINERAL_PERCENT: N = n!("http://example.com/mineralPercent");
    pub const ALTERATION_TYPE: N = n!("http://example.com/alterationType");
    pub const ALTERATION_INTENSITY: N = n!("http://example.com/alterationIntensity");
    pub const DEPTH: N = n!("http://example.com/depth");
}

/// Mints `base` + `segment`, percent-encoding anything in the segment that
/// is not an unreserved IRI character.
pub fn mint(base: &str, segment: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{base}{}", encode_segment(segment)))
}

pub fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.trim().bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}

/// True when `value` looks like an absolute http(s) IRI with no whitespace.
pub fn is_http_iri(value: &str) -> bool {
    (value.starts_with("http://") || value.starts_with("https://"))
        && !value.chars().any(char::is_whitespace)
        && NamedNode::new(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_segments_are_encoded() {
        assert_eq!(
            mint(QLDBORES, "DD12345").as_str(),
            "https://linked.data.gov.au/dataset/gsq-bores/DD12345"
        );
        assert_eq!(encode_segment("ABC Corp/GC"), "ABC%20Corp%2FGC");
        assert_eq!(encode_segment("kg/L"), "kg%2FL");
    }

    #[test]
    fn distinct_segments_mint_distinct_iris() {
        let keys = ["DD 1", "DD-1", "DD_1", "DD%201", "DD/1"];
        let mut minted: Vec<String> = keys
            .iter()
            .map(|key| mint(QLDBORES, key).as_str().to_string())
            .collect();
        minted.sort_unstable();
        minted.dedup();
        assert_eq!(minted.len(), keys.len());
        assert_eq!(encode_segment("DD 1"), "DD%201");
    }

    #[test]
    fn http_iri_detection() {
        assert!(is_http_iri("https://example.com/ds/1"));
        assert!(!is_http_iri("ex:thing"));
        assert!(!is_http_iri("https://example.com/a b"));
    }
}
