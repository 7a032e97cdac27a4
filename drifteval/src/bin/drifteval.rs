use anyhow::Context as _;
use drifteval::source::DirSource;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = clap::Command::new("drifteval")
        .version("0.1")
        .about("correct IMU clock drift and validate the onboard motion detector")
        .arg(
            clap::Arg::new("CONFIG")
                .help("config file to use")
                .required(true),
        )
        .arg(
            clap::Arg::new("segments")
                .long("segments")
                .help("print the drift segments")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("json")
                .long("json")
                .help("print the whole report as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let cfgpath = matches
        .get_one::<String>("CONFIG")
        .context("no config given")?;
    let cfg = drifteval::config::load(cfgpath)
        .with_context(|| format!("can't load config {}", cfgpath))?;

    let source = DirSource::from_config(&cfg.data);
    let evaluation = drifteval::eval::evaluate(&source, &cfg.data.date_range(), &cfg)
        .context("evaluation failed")?;
    let report = drifteval::eval::Report::from(&evaluation);

    if matches.get_flag("json") {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("can't serialize report")?
        );
        return Ok(());
    }

    if matches.get_flag("segments") {
        println!(
            "{:>18} {:>18} {:>12} {:>12} {:>10}",
            "start_ts", "end_ts", "slope", "intercept", "offset"
        );
        for s in &report.segments {
            println!(
                "{:>18.3} {:>18.3} {:>12.3e} {:>12.3} {:>10.3}",
                s.start_ts, s.end_ts, s.slope, s.intercept, s.offset
            );
        }
    }

    println!("{}", report.metrics);

    Ok(())
}
