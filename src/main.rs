use liftsim::building::metrics::MetricsCollector;
use liftsim::realtime::{self, DriverOutput};
use liftsim::scenario::Scenario;
use liftsim::{ElevatorEvent, SimulationConfig, SimulationEngine, SimulationObserver, SimulationTime};
use std::io::BufRead;
use std::time::Duration;

const DEFAULT_RANDOM_CALLS: usize = 20;

const USAGE: &str = "\
usage: liftsim [options]

  --elevators N     number of cars (default 5)
  --floors N        number of floors (default 10)
  --calls SCRIPT    scripted calls, e.g. \"0:5,0:2,4:9\"
  --random N        generate N random calls (default 20)
  --seed S          random seed (default 42)
  --mean T          mean time between random calls (default 5)
  --max-time T      stop the simulation at time T
  --realtime        read floor numbers from stdin and run on the wall clock
  --unit-ms MS      real-time length of one time unit (default 1000)
  --json            print events as JSON lines";

#[derive(Debug)]
struct Options {
    config: SimulationConfig,
    calls: Option<String>,
    random_calls: Option<usize>,
    seed: u64,
    mean_interarrival: f64,
    realtime: bool,
    unit_ms: u64,
    json: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: SimulationConfig::default(),
            calls: None,
            random_calls: None,
            seed: 42,
            mean_interarrival: 5.0,
            realtime: false,
            unit_ms: 1000,
            json: false,
        }
    }
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    fn value<'a>(flag: &str, iter: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, String> {
        iter.next().ok_or_else(|| format!("{} needs a value", flag))
    }
    fn number<T: std::str::FromStr>(flag: &str, raw: &str) -> Result<T, String> {
        raw.parse().map_err(|_| format!("{} expects a number, got '{}'", flag, raw))
    }

    let mut options = Options::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--elevators" => {
                let count = number(flag, value(flag, &mut iter)?)?;
                options.config = options.config.with_elevators(count);
            }
            "--floors" => {
                let count = number(flag, value(flag, &mut iter)?)?;
                options.config = options.config.with_floors(count);
            }
            "--max-time" => {
                let max = number(flag, value(flag, &mut iter)?)?;
                options.config = options.config.with_max_time(Some(max));
            }
            "--calls" => options.calls = Some(value(flag, &mut iter)?.clone()),
            "--random" => options.random_calls = Some(number(flag, value(flag, &mut iter)?)?),
            "--seed" => options.seed = number(flag, value(flag, &mut iter)?)?,
            "--mean" => options.mean_interarrival = number(flag, value(flag, &mut iter)?)?,
            "--unit-ms" => options.unit_ms = number(flag, value(flag, &mut iter)?)?,
            "--realtime" => options.realtime = true,
            "--json" => options.json = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("unknown option '{}'\n\n{}", other, USAGE)),
        }
    }
    Ok(options)
}

/// Prints the event stream in place of the building animation
struct TerminalObserver {
    json: bool,
}

impl TerminalObserver {
    fn print(&self, time: SimulationTime, event: &ElevatorEvent) {
        if self.json {
            let timed = liftsim::TimedEvent { time, event: *event };
            match serde_json::to_string(&timed) {
                Ok(line) => println!("{}", line),
                Err(e) => log::error!("Failed to encode event: {}", e),
            }
        } else {
            println!("[t={:>5}] {}", time, event);
        }
    }
}

impl SimulationObserver for TerminalObserver {
    fn on_elevator_event(&mut self, time: SimulationTime, event: &ElevatorEvent) {
        self.print(time, event);
    }
}

fn run_virtual(options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = match &options.calls {
        Some(script) => Scenario::parse(script)?,
        None => Scenario::random(
            options.seed,
            options.random_calls.unwrap_or(DEFAULT_RANDOM_CALLS),
            options.mean_interarrival,
            options.config.num_floors,
        )?,
    };

    let mut engine = SimulationEngine::new(options.config.clone())?;
    let metrics = MetricsCollector::new();
    engine.add_observer(Box::new(TerminalObserver { json: options.json }));
    engine.add_observer(Box::new(metrics.clone()));

    scenario.load_into(&mut engine)?;
    let final_time = engine.run()?;

    log::info!("Simulation finished at time {}", final_time);
    if !options.json {
        println!();
        print!("{}", metrics.summary());
    }
    Ok(())
}

fn run_realtime(options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    let handle = realtime::spawn(options.config.clone(), Duration::from_millis(options.unit_ms))?;

    let printer = {
        let outputs = handle.outputs().clone();
        let terminal = TerminalObserver { json: options.json };
        std::thread::spawn(move || {
            for output in outputs.iter() {
                match output {
                    DriverOutput::Event(timed) => terminal.print(timed.time, &timed.event),
                    DriverOutput::Rejected { floor, reason } => {
                        eprintln!("call at floor {} rejected: {}", floor, reason)
                    }
                }
            }
        })
    };

    println!(
        "Enter a floor number (0-{}) to call an elevator, 'q' to quit.",
        options.config.num_floors.saturating_sub(1)
    );
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "q" {
            break;
        }
        match input.parse() {
            Ok(floor) => handle.request_floor(floor)?,
            Err(_) => eprintln!("not a floor number: '{}'", input),
        }
    }

    let final_time = handle.shutdown()?;
    log::info!("Stopped at time {}", final_time);
    let _ = printer.join();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };
    options.config.validate()?;

    if options.realtime {
        run_realtime(&options)
    } else {
        run_virtual(&options)
    }
}
