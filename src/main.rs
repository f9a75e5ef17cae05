use std::str::FromStr;
use std::sync::mpsc::channel;

use speedsolve::algorithm::Algorithm;
use speedsolve::runner::{SolveEvent, SolveMethod, SolveRequest, SolveRunner};

fn parse_method(name: &str) -> SolveMethod {
    match name.to_ascii_lowercase().as_str() {
        "roux" => SolveMethod::Roux,
        "petrus" => SolveMethod::Petrus,
        "zz" => SolveMethod::Zz,
        "ceor" | "yruru" => SolveMethod::Ceor,
        "mehta" => SolveMethod::Mehta,
        "nautilus" => SolveMethod::Nautilus,
        "leor" => SolveMethod::Leor,
        "lbl" => SolveMethod::Lbl,
        _ => SolveMethod::Cfop,
    }
}

fn main() {
    let mut args = std::env::args().skip(1);
    let method = parse_method(&args.next().unwrap_or_else(|| "cfop".into()));
    let scramble = match args.next() {
        Some(s) => s,
        None => {
            let moves = speedsolve::scramble();
            Algorithm::from_moves(moves).to_string()
        }
    };

    println!("Scramble: {}", scramble);
    let request = SolveRequest {
        scramble,
        method,
        ..SolveRequest::default()
    };
    // a request with an unparseable scramble fails before any search
    let Ok(parsed) = Algorithm::from_str(&request.scramble) else {
        eprintln!("invalid scramble");
        std::process::exit(1);
    };
    #[cfg(feature = "term")]
    {
        use speedsolve::cubie::CubieCube;
        use speedsolve::facelet::FaceCube;
        let state = CubieCube::default().apply_moves(parsed.moves());
        let _ = speedsolve::printer::print_facelet(&FaceCube::from_cubie(&state));
    }
    #[cfg(not(feature = "term"))]
    let _ = parsed;

    let (tx, rx) = channel();
    let mut runner = SolveRunner::new();
    runner.solve(&request, &tx).expect("scramble already checked");
    drop(tx);

    for event in rx {
        match event {
            SolveEvent::StageStart(stage) => println!("... {}", stage),
            SolveEvent::CacheHit => println!("... cache hit"),
            SolveEvent::NoSolves => println!("No solves!"),
            SolveEvent::Solves {
                report,
                best_report,
                time_report,
                ..
            } => {
                println!("\nSolves:\n{}", report);
                println!("Best solve:\n{}", best_report);
                println!("{}", time_report);
            }
        }
    }
}
