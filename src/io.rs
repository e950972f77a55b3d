use crate::error::{Result, SimulationError};
use colored::*;
use log::debug;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

pub const DATA_PATH: &'static str = "./data";

pub const PRE_PROCESSING_PATH: &'static str = "./pre_processing";

pub const CASE_SETUP_FILE: &'static str = "case_setup.jou";

pub const POST_PROCESSING_PATH: &'static str = "./post_processing";

pub const PARTICLES_FILE: &'static str = "particles.dat";

pub const SD_NUM_FILE: &'static str = "sd_num.dat";

pub const SD_NUM_GRAPH_FILE: &'static str = "gr_sd_num.gp";

#[derive(Clone, Debug, PartialEq)]
pub enum WriteDataMode {
    Frequency(usize),

    ListOfSteps(Vec<usize>),
}

impl WriteDataMode {
    /// Parses `frequency <n>` or `list <step> <step> ...`.
    pub fn parse(mode: &str) -> Result<Self> {
        let invalid = || SimulationError::InvalidParameter {
            key: String::from("write_data_mode"),
            value: mode.to_string(),
        };
        let mut words = mode.split_whitespace();
        match words.next() {
            Some("frequency") => {
                let frequency = words
                    .next()
                    .ok_or_else(invalid)?
                    .parse::<usize>()
                    .map_err(|_| invalid())?;
                if frequency == 0 {
                    return Err(invalid());
                }
                Ok(WriteDataMode::Frequency(frequency))
            }
            Some("list") => {
                let list = words
                    .map(|x| x.parse::<usize>().map_err(|_| invalid()))
                    .collect::<Result<Vec<usize>>>()?;
                Ok(WriteDataMode::ListOfSteps(list))
            }
            _ => Err(invalid()),
        }
    }

    pub fn includes(&self, time_step: usize) -> bool {
        match self {
            WriteDataMode::Frequency(n) => time_step % n == 0,
            WriteDataMode::ListOfSteps(list) => list.contains(&time_step),
        }
    }
}

pub fn create_case_directories() -> Result<()> {
    let list_of_paths = [DATA_PATH, PRE_PROCESSING_PATH, POST_PROCESSING_PATH];
    for path_str in list_of_paths {
        let path = Path::new(path_str);
        if !path.exists() {
            println!("Creating the {} path.\n", path_str.yellow().bold());
            fs::create_dir_all(path)?;
        } else {
            debug!("The {path_str} path already exists.");
        }
    }
    Ok(())
}

pub fn read_case_setup() -> Result<HashMap<String, String>> {
    let path = Path::new(PRE_PROCESSING_PATH).join(CASE_SETUP_FILE);
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(extract_parameters(&contents))
}

pub fn extract_parameters(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.starts_with("#"))
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut parts = line.splitn(2, "=");
            let key = parts.next().unwrap_or_default().trim().to_string();
            let value = parts.next().unwrap_or("").trim().to_string();
            (key, value)
        })
        .collect::<HashMap<String, String>>()
}

pub fn write_inside_loop_elapsed_time(
    elapsed_times: &[(&str, Duration)],
    time_step: &usize,
) -> Result<()> {
    let path = Path::new(POST_PROCESSING_PATH).join("benchmark_elapsed_time.dat");
    let new_file = !path.exists();
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if new_file {
        write!(file, "{:>8}", "step")?;
        for (key, _) in elapsed_times {
            write!(file, " {:>16}", key)?;
        }
        writeln!(file)?;
    }
    write!(file, "{:>8}", time_step)?;
    for (_, value) in elapsed_times {
        write!(file, " {:>16.8e}", value.as_secs_f64())?;
    }
    writeln!(file)?;
    Ok(())
}
