use super::{Displacement, SedimentationReport, Setup, Simulation};
use crate::error::{Result, SimulationError};
use crate::global_variables::*;
use crate::particles::Particles;
use colored::*;
use log::{info, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

impl Setup {
    pub fn build_case_setup() -> Result<Setup> {
        crate::io::create_case_directories()?;
        let case_setup_path =
            Path::new(crate::io::PRE_PROCESSING_PATH).join(crate::io::CASE_SETUP_FILE);
        if case_setup_path.exists() {
            println!(
                "Reading the case setup file: {}.\n",
                case_setup_path.display().to_string().yellow().bold()
            );
            let parameters = crate::io::read_case_setup()?;
            Setup::from_parameters(parameters)
        } else {
            warn!(
                "No case setup file at {}, using the default case.",
                case_setup_path.display()
            );
            Ok(Setup::default())
        }
    }
}

impl Simulation {
    pub fn print_report(&self, report: &SedimentationReport, displacement: &Displacement) {
        if self.time_step.saturating_sub(1) % REPORT_HEADER_FREQUENCY == 0 {
            let duration = self.simulation_time.elapsed().as_secs_f64();
            println!("\n{} {:.2} s.", "Elapsed time:".cyan().bold(), duration);
            println!(
                "\n{:>8} {:>16} {:>16} {:>16}\n",
                "step".cyan().bold(),
                "sd_num".cyan().bold(),
                "removed".cyan().bold(),
                "precipitated_n".cyan().bold(),
            );
        }
        println!(
            "{:>8} {:>16} {:>16} {:>16}",
            self.time_step, report.remaining, report.removed, displacement.precipitated_multiplicity
        );
    }

    pub fn write_report(
        &self,
        report: &SedimentationReport,
        displacement: &Displacement,
    ) -> Result<()> {
        let path = Path::new(crate::io::DATA_PATH).join(crate::io::SD_NUM_FILE);
        let new_file = !path.exists();
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if new_file {
            writeln!(
                file,
                "{:>8} {:>16} {:>16} {:>16}",
                "step", "sd_num", "removed", "precipitated_n"
            )?;
        }
        writeln!(
            file,
            "{:>8} {:>16} {:>16} {:>16}",
            self.time_step, report.remaining, report.removed, displacement.precipitated_multiplicity
        )?;
        Ok(())
    }

    pub fn write_data(&self, particles: &Particles) -> Result<()> {
        if self.write_data_mode.includes(self.time_step) {
            self.write_data_from_steps(particles)?;
        }
        Ok(())
    }

    pub fn write_post_processing_from_each_n_steps<F>(
        &self,
        particles: &Particles,
        displacement: &Displacement,
        n: usize,
        function: F,
        file_name: &str,
    ) -> Result<()>
    where
        F: Fn(&Particles, &Displacement) -> Vec<crate::post::PostResult>,
    {
        if self.time_step % n == 0 {
            let post_results = &function(particles, displacement);
            let path = Path::new(crate::io::POST_PROCESSING_PATH).join(file_name);
            let new_file = !path.exists();
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            if new_file {
                write!(file, "{:>8}", "step")?;
                for post_result in post_results {
                    write!(file, " {:>16}", post_result.name)?;
                }
                writeln!(file)?;
            }
            write!(file, "{:>8}", self.time_step)?;
            for post_result in post_results {
                write!(file, " {:>16.8e}", post_result.value)?;
            }
            writeln!(file)?;
        }
        Ok(())
    }

    pub fn create_script_for_sd_num_graph(&self) -> Result<()> {
        let path = Path::new(crate::io::POST_PROCESSING_PATH).join(crate::io::SD_NUM_GRAPH_FILE);
        let mut file = File::create(&path)?;
        println!(
            "Creating the super-droplet count graph script: {}.\n",
            path.display().to_string().yellow().bold()
        );
        writeln!(
            file,
            r#"set title "{case_name}"
    set ylabel "Number of super-droplets"
    set xlabel "Time step"
    set grid
    set mxtics 5
    set terminal push
    set terminal pngcairo font "courier"
    set output "fig_{case_name_prefix}_sd_num.png"
    plot "../data/sd_num.dat" u 1:2 t "SD_num" w l
    set terminal pdfcairo font "courier"
    set output "fig_{case_name_prefix}_sd_num.pdf"
    replot
    set terminal pop
    set output"#,
            case_name = self.case_name,
            case_name_prefix = self.case_name.replace(" ", "_").to_lowercase(),
        )?;
        Ok(())
    }

    pub fn write_data_from_steps(&self, particles: &Particles) -> Result<()> {
        let step_path = Path::new(crate::io::DATA_PATH).join(self.time_step.to_string());
        fs::create_dir_all(&step_path)?;
        println!(
            "\nWriting {} for time step {}.\n",
            crate::io::PARTICLES_FILE.yellow().bold(),
            self.time_step.to_string().yellow().bold()
        );
        write_particles(particles, step_path.join(crate::io::PARTICLES_FILE))
    }
}

fn write_particles<P: AsRef<Path>>(particles: &Particles, path: P) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(
        file,
        "{:>8} {:>16} {:>16} {:>16}",
        "slot", "z", "radius", "multiplicity"
    )?;
    for &slot in particles.active_ids() {
        writeln!(
            file,
            "{:>8} {:>16.8e} {:>16.8e} {:>16}",
            slot,
            particles.z(slot),
            particles.radius(slot),
            particles.multiplicity(slot)
        )?;
    }
    Ok(())
}

/// Reads an active-particle snapshot back as a fresh particle set.
pub fn read_particles<P: AsRef<Path>>(path: P) -> Result<Particles> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut z = Vec::new();
    let mut radius = Vec::new();
    let mut multiplicity = Vec::new();
    for line in reader.lines().skip(1) {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        let invalid = || SimulationError::InvalidParameter {
            key: String::from(crate::io::PARTICLES_FILE),
            value: line.clone(),
        };
        if parts.len() != 4 {
            return Err(invalid());
        }
        z.push(parts[1].parse::<Float>().map_err(|_| invalid())?);
        radius.push(parts[2].parse::<Float>().map_err(|_| invalid())?);
        multiplicity.push(parts[3].parse::<u64>().map_err(|_| invalid())?);
    }
    Particles::new(z, radius, multiplicity)
}

pub fn run_post_processing(time_step: usize) -> Result<()> {
    let path = Path::new(crate::io::DATA_PATH)
        .join(time_step.to_string())
        .join(crate::io::PARTICLES_FILE);
    info!("Reading {}.", path.display());
    let particles = read_particles(&path)?;
    println!(
        "\n{:>8} {:>16} {:>16} {:>16}\n",
        "step".cyan().bold(),
        "sd_num".cyan().bold(),
        "mean_height".cyan().bold(),
        "multiplicity".cyan().bold(),
    );
    println!(
        "{:>8} {:>16} {:>16.8e} {:>16}",
        time_step,
        particles.sd_num(),
        particles.mean_z().unwrap_or(Float::NAN),
        particles.total_multiplicity()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn snapshot_keeps_only_active_particles() {
        let mut particles =
            Particles::new(vec![1.5, 2.5, 3.5], vec![1e-5, 2e-5, 3e-5], vec![7, 8, 9]).unwrap();
        particles.remove(1);

        let path = std::env::temp_dir().join(format!(
            "sdm_sedimentation_snapshot_{}.dat",
            std::process::id()
        ));
        write_particles(&particles, &path).unwrap();
        let restored = read_particles(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(restored.sd_num(), 2);
        assert_relative_eq!(restored.z(1), 3.5);
        assert_relative_eq!(restored.radius(1), 3e-5);
        assert_eq!(restored.multiplicity(0), 7);
    }

    #[test]
    fn malformed_snapshot_line_is_rejected() {
        let path = std::env::temp_dir().join(format!(
            "sdm_sedimentation_malformed_{}.dat",
            std::process::id()
        ));
        fs::write(&path, "slot z radius multiplicity\n0 1.0 oops 3\n").unwrap();
        let result = read_particles(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(SimulationError::InvalidParameter { .. })));
    }
}
