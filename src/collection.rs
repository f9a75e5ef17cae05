use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::debug;

use crate::algorithm::{Algorithm, Y_TURNS};
use crate::error::Error;
use crate::moves::Metrics;

/// Selection policy for collection lookups.
///
/// `First` returns the case's algorithm as authored, `Short` the shortest
/// under the active metric. `Best` is the evaluator-side multi-criterion
/// policy; at the collection level it behaves like `Short`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Policy {
    #[default]
    First,
    Short,
    Best,
}

/// A named case with the algorithms that solve it.
#[derive(Debug, Clone, Default)]
pub struct Case {
    pub name: String,
    pub algs: Vec<Algorithm>,
}

/// An ordered catalogue of cases, read-only after load.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    name: String,
    description: String,
    cases: Vec<Case>,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} cases)", self.name, self.cases.len())
    }
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn cases_number(&self) -> usize {
        self.cases.len()
    }

    pub fn case_name(&self, case: usize) -> &str {
        self.cases.get(case).map(|c| c.name.as_str()).unwrap_or("")
    }

    pub fn algorithms_number(&self, case: usize) -> usize {
        self.cases.get(case).map(|c| c.algs.len()).unwrap_or(0)
    }

    /// The algorithm for a case under the given policy and metric.
    pub fn algorithm(&self, case: usize, policy: Policy, metric: Metrics) -> Algorithm {
        let Some(c) = self.cases.get(case) else {
            return Algorithm::new();
        };
        match policy {
            Policy::First => c.algs.first().cloned().unwrap_or_default(),
            Policy::Short | Policy::Best => c
                .algs
                .iter()
                .min_by(|a, b| {
                    a.metric(metric)
                        .partial_cmp(&b.metric(metric))
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then(a.subjective_score().cmp(&b.subjective_score()))
                })
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// The same algorithm conjugated by the y turn that minimises the
    /// subjective movement score; cube effect is preserved.
    pub fn subjective_best_y(alg: &Algorithm) -> Algorithm {
        let mut best = alg.clone();
        let mut best_score = alg.subjective_score();
        for yt in Y_TURNS.iter().skip(1) {
            let mut candidate = Algorithm::new();
            candidate.push(*yt);
            let mut inner = alg.clone();
            inner.transform_turn(*yt);
            candidate.append(&inner);
            candidate.push(yt.get_inverse());
            let score = candidate.subjective_score();
            if score < best_score {
                best_score = score;
                best = candidate;
            }
        }
        best
    }

    /// Parse the companion TXT format: blank-line separated blocks, the
    /// first holding the collection name and description, every further
    /// block one case (name line, then one algorithm per line). Lines
    /// starting with `#` are comments.
    pub fn from_txt(data: &str) -> Result<Collection, Error> {
        let mut blocks: Vec<Vec<&str>> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for line in data.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            if line.is_empty() {
                if !current.is_empty() {
                    blocks.push(std::mem::take(&mut current));
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            blocks.push(current);
        }
        if blocks.is_empty() {
            return Err(Error::InvalidCollection("empty file".into()));
        }
        let header = &blocks[0];
        let mut collection = Collection {
            name: header.first().unwrap_or(&"").to_string(),
            description: header.get(1).unwrap_or(&"").to_string(),
            cases: Vec::new(),
        };
        for block in blocks.iter().skip(1) {
            let mut case = Case {
                name: block[0].to_string(),
                algs: Vec::new(),
            };
            for line in block.iter().skip(1) {
                case.algs.push(Algorithm::from_str(line)?);
            }
            if case.algs.is_empty() {
                // a case with no algorithm line solves itself (skip case)
                case.algs.push(Algorithm::new());
            }
            collection.cases.push(case);
        }
        Ok(collection)
    }

    /// Parse the conventional XML collection format:
    /// `<Collection Name=.. Description=..><Case Name=..><Algorithm>..`.
    pub fn from_xml(data: &str) -> Result<Collection, Error> {
        let mut collection = Collection::default();
        let mut case: Option<Case> = None;
        let mut rest = data;
        while let Some(start) = rest.find('<') {
            let Some(end) = rest[start..].find('>') else {
                return Err(Error::InvalidCollection("unterminated tag".into()));
            };
            let tag = &rest[start + 1..start + end];
            let after = &rest[start + end + 1..];
            if let Some(attrs) = tag.strip_prefix("Collection") {
                collection.name = xml_attr(attrs, "Name").unwrap_or_default();
                collection.description = xml_attr(attrs, "Description").unwrap_or_default();
                rest = after;
            } else if let Some(attrs) = tag.strip_prefix("Case") {
                if let Some(open) = case.take() {
                    collection.cases.push(open);
                }
                case = Some(Case {
                    name: xml_attr(attrs, "Name").unwrap_or_default(),
                    algs: Vec::new(),
                });
                rest = after;
            } else if tag == "Algorithm" {
                let Some(close) = after.find("</Algorithm>") else {
                    return Err(Error::InvalidCollection("unterminated algorithm".into()));
                };
                let text = after[..close].trim();
                let alg = Algorithm::from_str(text)?;
                match case.as_mut() {
                    Some(c) => c.algs.push(alg),
                    None => {
                        return Err(Error::InvalidCollection("algorithm outside case".into()))
                    }
                }
                rest = &after[close + "</Algorithm>".len()..];
            } else if tag == "/Case" {
                if let Some(mut open) = case.take() {
                    if open.algs.is_empty() {
                        open.algs.push(Algorithm::new());
                    }
                    collection.cases.push(open);
                }
                rest = after;
            } else {
                rest = after;
            }
        }
        if let Some(open) = case.take() {
            collection.cases.push(open);
        }
        Ok(collection)
    }
}

fn xml_attr(attrs: &str, key: &str) -> Option<String> {
    let pattern = format!("{}=\"", key);
    let start = attrs.find(&pattern)? + pattern.len();
    let end = attrs[start..].find('"')?;
    Some(attrs[start..start + end].to_string())
}

/// All algorithm catalogues a solve may consult. Owned by the façade and
/// handed to method drivers by reference; never global state.
#[derive(Debug, Clone)]
pub struct CollectionRegistry {
    pub oll: Collection,
    pub pll: Collection,
    pub one_lll: Collection,
    pub zbll: Collection,
    pub ocll: Collection,
    pub cmll: Collection,
    pub coll: Collection,
    pub epll: Collection,
    pub two_gll: Collection,
    pub eole: Collection,
    pub six_co: Collection,
    pub six_cp: Collection,
    pub apdr: Collection,
    pub cdrll: Collection,
    pub dcal: Collection,
    pub jtle: Collection,
    pub l5ep: Collection,
    pub tdr: Collection,
    pub ncll: Collection,
    pub ncoll: Collection,
    pub tncll: Collection,
    pub l5e: Collection,
    pub eodf: Collection,
}

macro_rules! builtin_set {
    ($file:expr) => {
        Collection::from_txt(include_str!(concat!("../algsets/", $file)))
            .expect(concat!("builtin algset ", $file))
    };
}

impl CollectionRegistry {
    /// The algorithm sets shipped with the crate.
    pub fn builtin() -> CollectionRegistry {
        CollectionRegistry {
            oll: builtin_set!("OLL.txt"),
            pll: builtin_set!("PLL.txt"),
            one_lll: builtin_set!("1LLL.txt"),
            zbll: builtin_set!("ZBLL.txt"),
            ocll: builtin_set!("OCLL.txt"),
            cmll: builtin_set!("CMLL.txt"),
            coll: builtin_set!("COLL.txt"),
            epll: builtin_set!("EPLL.txt"),
            two_gll: builtin_set!("2GLL.txt"),
            eole: builtin_set!("EOLE.txt"),
            six_co: builtin_set!("6CO.txt"),
            six_cp: builtin_set!("6CP.txt"),
            apdr: builtin_set!("APDR.txt"),
            cdrll: builtin_set!("CDRLL.txt"),
            dcal: builtin_set!("DCAL.txt"),
            jtle: builtin_set!("JTLE.txt"),
            l5ep: builtin_set!("L5EP.txt"),
            tdr: builtin_set!("TDR.txt"),
            ncll: builtin_set!("NCLL.txt"),
            ncoll: builtin_set!("NCOLL.txt"),
            tncll: builtin_set!("TNCLL.txt"),
            l5e: builtin_set!("L5E.txt"),
            eodf: builtin_set!("EODF.txt"),
        }
    }

    /// Replace builtin sets with XML or TXT files found in a directory.
    /// Unknown files are ignored; unreadable known files keep the builtin.
    pub fn load_dir(&mut self, dir: &Path) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(_) => return,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Ok(data) = std::fs::read_to_string(&path) else {
                continue;
            };
            let parsed = match path.extension().and_then(|e| e.to_str()) {
                Some("xml") => Collection::from_xml(&data),
                Some("txt") => Collection::from_txt(&data),
                _ => continue,
            };
            let Ok(collection) = parsed else {
                debug!("skipping unreadable algset file {:?}", path);
                continue;
            };
            let slot = match stem {
                "OLL" => &mut self.oll,
                "PLL" => &mut self.pll,
                "1LLL" => &mut self.one_lll,
                "ZBLL" => &mut self.zbll,
                "OCLL" => &mut self.ocll,
                "CMLL" => &mut self.cmll,
                "COLL" => &mut self.coll,
                "EPLL" => &mut self.epll,
                "2GLL" => &mut self.two_gll,
                "EOLE" => &mut self.eole,
                "6CO" => &mut self.six_co,
                "6CP" => &mut self.six_cp,
                "APDR" => &mut self.apdr,
                "CDRLL" => &mut self.cdrll,
                "DCAL" => &mut self.dcal,
                "JTLE" => &mut self.jtle,
                "L5EP" => &mut self.l5ep,
                "TDR" => &mut self.tdr,
                "NCLL" => &mut self.ncll,
                "NCOLL" => &mut self.ncoll,
                "TNCLL" => &mut self.tncll,
                "L5E" => &mut self.l5e,
                "EODF" => &mut self.eodf,
                _ => continue,
            };
            debug!("loaded algset {} from {:?}", stem, path);
            *slot = collection;
        }
    }
}

/// Verify a collection: every algorithm of every case must leave the first
/// two layers intact when conjugated home. Used by the audit tests.
pub fn check_f2l_integrity(alg: &Algorithm) -> bool {
    use crate::cube::Cube;
    use crate::pieces::PieceGroup;
    let mut c = Cube::new();
    c.apply_algorithm(alg);
    c.set_spin(crate::spin::Spin::UF);
    c.is_group_solved(PieceGroup::F2l)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TXT: &str = "\
Sample
A tiny test collection

Skip

Sune
R U R' U R U2 R'

Double
R U2 R' U' R U' R'
R U R' U R U' R' U R U2 R'
";

    #[test]
    fn test_txt_parse() {
        let c = Collection::from_txt(SAMPLE_TXT).unwrap();
        assert_eq!(c.name(), "Sample");
        assert_eq!(c.cases_number(), 3);
        assert_eq!(c.case_name(0), "Skip");
        assert!(c.algorithm(0, Policy::First, Metrics::HTM).is_empty());
        assert_eq!(c.case_name(1), "Sune");
        assert_eq!(c.algorithms_number(2), 2);
    }

    #[test]
    fn test_short_policy() {
        let c = Collection::from_txt(SAMPLE_TXT).unwrap();
        let short = c.algorithm(2, Policy::Short, Metrics::HTM);
        assert_eq!(short.num_steps(), 7);
        let first = c.algorithm(2, Policy::First, Metrics::HTM);
        assert_eq!(first.num_steps(), 7);
    }

    #[test]
    fn test_xml_parse() {
        let xml = r#"
<Collection Name="Mini" Description="two cases">
  <Case Name="Skip">
  </Case>
  <Case Name="Sexy">
    <Algorithm>R U R' U'</Algorithm>
  </Case>
</Collection>"#;
        let c = Collection::from_xml(xml).unwrap();
        assert_eq!(c.name(), "Mini");
        assert_eq!(c.cases_number(), 2);
        assert_eq!(c.algorithm(1, Policy::First, Metrics::HTM).num_steps(), 4);
    }

    #[test]
    fn test_subjective_best_y_preserves_effect() {
        use crate::cubie::CubieCube;
        let alg: Algorithm = "B U B' U'".parse().unwrap();
        let best = Collection::subjective_best_y(&alg);
        let a = CubieCube::default().apply_moves(alg.moves());
        let b = CubieCube::default().apply_moves(best.moves());
        assert_eq!(a, b);
        assert!(best.subjective_score() <= alg.subjective_score());
    }

    #[test]
    fn test_builtin_sets_load() {
        let reg = CollectionRegistry::builtin();
        assert!(reg.oll.cases_number() > 0);
        assert!(reg.pll.cases_number() > 0);
        assert!(reg.cmll.cases_number() > 0);
        assert_eq!(reg.oll.name(), "OLL");
    }

    #[test]
    fn test_f2l_integrity_audit() {
        // last layer algorithms keep the first two layers intact
        let alg: Algorithm = "R U R' U R U2 R'".parse().unwrap();
        assert!(check_f2l_integrity(&alg));
        let alg: Algorithm = "R U R'".parse().unwrap();
        assert!(!check_f2l_integrity(&alg));
    }
}
