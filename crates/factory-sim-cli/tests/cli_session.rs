//! End-to-end shell sessions driven through in-memory streams.

use factory_sim::config::{ReportTiming, SimulationConfig};
use factory_sim::controller::{BANNER, Controller, ENDED, PROMPT, STARTING};
use factory_sim::error::CliError;
use factory_sim_core::id::{StationId, StationRef};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

type Session = Controller<Cursor<Vec<u8>>, Vec<u8>, Vec<u8>>;

const CHAIN: &str = "\
add ramp -i 1 -t 1
add worker -i 1 -t 1 -q FIFO
add storehouse -i 1
add link -i 1 -s ramp-1 -d worker-1 -p 1
add link -i 2 -s worker-1 -d store-1 -p 1
";

fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("factory_sim_cli_{suffix}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn cleanup(dir: &Path) {
    let _ = fs::remove_dir_all(dir);
}

fn session(config: SimulationConfig, input: &str) -> Session {
    Controller::from_config(config, Cursor::new(input.as_bytes().to_vec()), Vec::new(), Vec::new()).unwrap()
}

fn quiet_config() -> SimulationConfig {
    SimulationConfig {
        max_iterations: 5,
        report: ReportTiming::Interval(0),
        seed: Some(11),
        ..SimulationConfig::default()
    }
}

// ===========================================================================
// Test 1: Build a chain from the shell and run it
// ===========================================================================

#[test]
fn shell_built_chain_runs() {
    let input = format!("{CHAIN}run\n");
    let mut c = session(quiet_config(), &input);
    c.run().unwrap();

    let store = c.factory().store(StationId(1)).unwrap();
    let delivered: Vec<String> = store.destination().products().map(|p| p.to_string()).collect();
    assert_eq!(delivered, ["#0", "#1", "#2", "#3"]);

    let out = String::from_utf8(c.into_output()).unwrap();
    assert!(out.starts_with(BANNER));
    let start = out.find(STARTING).unwrap();
    let structure = out.find("========= Factory Structure ========").unwrap();
    assert!(start < structure);
    assert!(out.ends_with(&format!("{ENDED}\n")));
    // Banner hint, then one prompt per command.
    assert_eq!(out.matches(PROMPT).count(), 7);
}

#[test]
fn end_of_input_skips_the_run() {
    let mut c = session(quiet_config(), CHAIN);
    c.run().unwrap();
    assert_eq!(c.factory().link_count(), 2);
    assert_eq!(c.factory().products_made(), 0);
    let out = String::from_utf8(c.into_output()).unwrap();
    assert!(!out.contains(STARTING));
}

// ===========================================================================
// Test 2: Edits, print and show-structure
// ===========================================================================

#[test]
fn remove_station_drops_its_links() {
    let input = format!("{CHAIN}remove worker -i 1\nexit\n");
    let mut c = session(quiet_config(), &input);
    c.run().unwrap();
    let f = c.factory();
    assert!(!f.contains_station(StationRef::worker(1)));
    assert_eq!(f.link_count(), 0);
}

#[test]
fn print_and_show_structure_echo_reports() {
    let mut c = session(quiet_config(), "add ramp -i 4 -t 2\nprint\n").show_structure(true);
    c.run().unwrap();
    let out = String::from_utf8(c.into_output()).unwrap();
    assert_eq!(out.matches("LOADING_RAMP #4\n\tDelivery interval: 2").count(), 2);
}

#[test]
fn validate_reports_first_problem() {
    let mut c = session(quiet_config(), "add ramp -i 1 -t 1\nadd storehouse -i 1\nvalidate\n");
    c.run().unwrap();
    let f = c.factory();
    assert_eq!(f.ramp_count(), 1);
    let Err(err) = f.validate() else {
        panic!("factory should be invalid");
    };
    assert_eq!(err.to_string(), "LOADING_RAMP #1 has no outgoing links");
}

// ===========================================================================
// Test 3: Files -- structure in, save out, report file
// ===========================================================================

#[test]
fn save_then_batch_run_from_file() {
    let dir = make_test_dir("save");
    let structure = dir.join("plant.txt");

    let input = format!("{CHAIN}save {}\nexit\n", structure.display());
    let mut c = session(quiet_config(), &input);
    c.run().unwrap();
    assert!(structure.exists());

    let report = dir.join("report.txt");
    let config = SimulationConfig {
        structure_file: Some(structure.clone()),
        report: ReportTiming::At(vec![0, 4]),
        report_file: Some(report.clone()),
        ..quiet_config()
    };
    let mut batch = session(config, "");
    batch.run_batch().unwrap();
    assert_eq!(batch.factory().link_count(), 2);

    let out = String::from_utf8(batch.into_output()).unwrap();
    assert_eq!(out, format!("{BANNER}\n{STARTING}\n{ENDED}\n"));

    let text = fs::read_to_string(&report).unwrap();
    assert!(text.contains("========= Iteration: 0 ========="));
    assert!(text.contains("========= Iteration: 4 ========="));
    assert!(!text.contains("========= Iteration: 2 ========="));

    cleanup(&dir);
}

#[test]
fn save_defaults_to_loaded_file() {
    let dir = make_test_dir("default_save");
    let structure = dir.join("plant.txt");
    fs::write(&structure, "STOREHOUSE id=1\n").unwrap();

    let config = SimulationConfig {
        structure_file: Some(structure.clone()),
        ..quiet_config()
    };
    let mut c = session(config, "add storehouse -i 2\nsave\nexit\n");
    c.run().unwrap();

    let saved = fs::read_to_string(&structure).unwrap();
    assert!(saved.contains("STOREHOUSE id=1"));
    assert!(saved.contains("STOREHOUSE id=2"));

    cleanup(&dir);
}

#[test]
fn bad_structure_file_names_path_and_line() {
    let dir = make_test_dir("bad_structure");
    let structure = dir.join("broken.txt");
    fs::write(&structure, "STOREHOUSE id=1\nCONVEYOR id=2\n").unwrap();

    let config = SimulationConfig {
        structure_file: Some(structure.clone()),
        ..quiet_config()
    };
    let result = Controller::from_config(config, Cursor::new(Vec::new()), Vec::<u8>::new(), Vec::<u8>::new());
    let Err(err) = result else {
        panic!("loading should fail");
    };
    assert!(matches!(err, CliError::Structure { .. }));
    let message = err.to_string();
    assert!(message.contains("broken.txt"));
    assert!(message.contains("line 2"));

    cleanup(&dir);
}

#[test]
fn missing_structure_file_names_path() {
    let dir = make_test_dir("missing_structure");
    let structure = dir.join("absent.txt");

    let config = SimulationConfig {
        structure_file: Some(structure.clone()),
        ..quiet_config()
    };
    let result = Controller::from_config(config, Cursor::new(Vec::new()), Vec::<u8>::new(), Vec::<u8>::new());
    let Err(err) = result else {
        panic!("loading should fail");
    };
    assert!(matches!(err, CliError::ReadStructure { ref path, .. } if *path == structure));
    assert!(err.to_string().starts_with(&format!("cannot read {}", structure.display())));

    cleanup(&dir);
}

#[test]
fn batch_refuses_invalid_factory() {
    let dir = make_test_dir("batch_invalid");
    let structure = dir.join("plant.txt");
    fs::write(&structure, "LOADING_RAMP id=1 delivery-interval=1\n").unwrap();

    let config = SimulationConfig {
        structure_file: Some(structure),
        ..quiet_config()
    };
    let mut c = session(config, "");
    assert!(matches!(c.run_batch(), Err(CliError::Sim(_))));

    cleanup(&dir);
}
