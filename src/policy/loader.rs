//! Load quote snapshots from JSON files

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use log::debug;

use super::PolicyInput;
use crate::assumptions::OccupationTable;
use crate::error::DataError;

/// Load one snapshot from a JSON file
pub fn load_policy_input<P: AsRef<Path>>(path: P) -> Result<PolicyInput, DataError> {
    let file = File::open(path.as_ref())?;
    load_policy_input_from_reader(BufReader::new(file))
}

/// Load one snapshot from any reader (string buffer, request body, ...)
pub fn load_policy_input_from_reader<R: Read>(reader: R) -> Result<PolicyInput, DataError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Load every `*.json` snapshot in a directory, sorted by file name
pub fn load_policy_inputs_from_dir<P: AsRef<Path>>(
    dir: P,
) -> Result<Vec<(PathBuf, PolicyInput)>, DataError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            debug!("loading snapshot {}", path.display());
            let input = load_policy_input(&path)?;
            Ok((path, input))
        })
        .collect()
}

/// Fill in risk groups from occupation names where none was given
pub fn resolve_occupations(input: &mut PolicyInput, occupations: &OccupationTable) {
    let persons = std::iter::once(&mut input.main_person)
        .chain(input.supplementary.iter_mut())
        .chain(input.waiver.iter_mut().filter_map(|w| w.other_person.as_mut()));

    for person in persons {
        if person.risk_group != 0 {
            continue;
        }
        if let Some(group) = person.occupation.as_deref().and_then(|name| occupations.group_of(name)) {
            debug!("person {} occupation resolved to risk group {}", person.id, group);
            person.risk_group = group;
        }
    }
}
