use console::Style;
use redox_core::pipeline::config::RunConfig;
use redox_core::pipeline::RunOutput;
use redox_core::session::SessionPlan;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn enabled(s: &Styles, on: bool) -> String {
    if on {
        s.method.apply_to("enabled").to_string()
    } else {
        s.disabled.apply_to("disabled").to_string()
    }
}

pub fn print_run_summary(config: &RunConfig, plan: &SessionPlan) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Redox Ratio Run"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(15)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Session"),
        s.path.apply_to(plan.session.root().display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Pairs"),
        s.value.apply_to(plan.pairs.len())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Formula"),
        s.method.apply_to(config.formula)
    );
    println!();

    let cal = &config.calibration;
    println!("  {}", s.header.apply_to("Calibration"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("FAD"),
        s.value.apply_to(format!("gain {}  power {}", cal.fad_gain, cal.fad_power))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("NADH"),
        s.value.apply_to(format!("gain {}  power {}", cal.nadh_gain, cal.nadh_power))
    );
    println!();

    println!("  {}", s.header.apply_to("Registration"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("NCC"),
        enabled(&s, config.registration.enabled)
    );
    if config.registration.enabled {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Subpixel"),
            enabled(&s, config.registration.subpixel)
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Degenerate"),
        s.value.apply_to(config.degenerate)
    );
    println!();

    if config.pretty {
        let render = &config.render;
        println!("  {}", s.header.apply_to("Pretty Render"));
        println!(
            "    {:<12}{}",
            s.label.apply_to("Range"),
            s.value.apply_to(format!("{} .. {}", render.botlim, render.uplim))
        );
        let lut = match render.lut {
            Some(ref table) => format!("custom, {} entries", table.len()),
            None => format!("jet, {} entries", render.lut_size),
        };
        println!("    {:<12}{}", s.label.apply_to("Colors"), s.value.apply_to(lut));
    } else {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Pretty Render"),
            s.disabled.apply_to("disabled")
        );
    }
    println!();
}

pub fn print_run_results(output: &RunOutput) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Results"));
    for pair in &output.pairs {
        let shift = match pair.registration {
            Some(ref reg) => format!("shift {}", reg.shift),
            None => "unregistered".to_string(),
        };
        println!(
            "    {:<16}{}  {}",
            s.label.apply_to(&pair.summary.label),
            s.value.apply_to(format!(
                "mean {:.4}  iqr {:.4}",
                pair.summary.mean, pair.summary.iqr
            )),
            s.disabled.apply_to(shift)
        );
    }
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(output.results_dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Summary"),
        s.path.apply_to(output.summary_path.display())
    );
    println!();
}
