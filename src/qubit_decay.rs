#![allow(dead_code, non_snake_case, non_upper_case_globals)]

use std::path::PathBuf;
use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::info;
use tracing_subscriber::{ fmt, prelude::*, EnvFilter };
use mesolve::{
    mkdir,
    write_npz,
    operators::*,
    SolverOptions,
};

const gamma: f64 = 0.1; // decay rate
const omega: f64 = 1.0; // qubit splitting

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

// usage: qubit_decay [options.toml]
fn main() -> anyhow::Result<()> {
    init_logging();
    let outdir = PathBuf::from("output");
    mkdir!(&outdir)?;

    let options: SolverOptions
        = match std::env::args().nth(1) {
            Some(path) => {
                info!(path = path.as_str(), "reading solver options");
                SolverOptions::from_toml_str(&std::fs::read_to_string(path)?)?
            },
            None => SolverOptions::default(),
        };

    let H: nd::Array2<C64> = sigma_z() * (omega / 2.0);
    let Ls: Vec<nd::Array2<C64>> = vec![sigma_minus() * gamma.sqrt()];
    let rho0: nd::Array2<C64> = basis_density(2, 0);
    let tsave: nd::Array1<f64> = nd::array![0.0, 1.0, 5.0, 10.0];

    let traj = mesolve::mesolve(&H, &Ls, &rho0, &tsave, "rk4", &options)?;

    let p_upper: nd::Array1<f64>
        = traj.iter().map(|(_, rho)| rho[[0, 0]].re).collect();
    println!("{:>6} {:>12} {:>12} {:>12}", "t", "p_upper", "exact", "tr(rho)");
    for ((t, p), tr) in traj.times().iter().zip(&p_upper).zip(&traj.traces()) {
        println!("{:6.2} {:12.8} {:12.8} {:12.8}", t, p, (-gamma * t).exp(), tr.re);
    }

    write_npz!(
        outdir.join("qubit_decay.npz"),
        arrays: {
            "time" => traj.times(),
            "rho" => traj.states(),
            "p_upper" => &p_upper,
        }
    )?;

    println!("done");
    Ok(())
}
