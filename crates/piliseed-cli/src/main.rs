// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use piliseed_api::Client;
use piliseed_app::{
    AppCommand, AppState, NavBarMetrics, NavigationBarController, PathPromptInput,
    RouteTabResolver, UserContext, target_path,
};
use piliseed_db::Store;
use piliseed_tui::UiOptions;
use runtime::ApiRuntime;
use std::env;
use std::fmt::Write as _;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    if let Some(path) = &options.resolve {
        print!("{}", describe_route(path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `piliseed --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let db_path = config.db_path()?;
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let start_route = match &options.route {
        Some(raw) => PathPromptInput::new(raw).validate()?,
        None => config.start_route().to_owned(),
    };
    let animation = config.animation()?;

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or PILISEED_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;

    let client = Client::new(config.api_base_url(), config.api_timeout()?).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;
    if options.check_only {
        client.ping()?;
        println!("ok: config, database and {} reachable", client.base_url());
        return Ok(());
    }

    let _log_guard = logging::init_tracing(&config.log_dir()?, &config.log_level())?;
    tracing::info!(
        db = %db_path.display(),
        api = %client.base_url(),
        timeout_ms = client.timeout().as_millis(),
        "starting piliseed"
    );

    let users = UserContext::init(store)?;
    let mut state = AppState::new(&start_route, NavBarMetrics::default());
    if let Some(user) = users.user() {
        state.dispatch(AppCommand::Login(user.clone()));
        state.dispatch(AppCommand::ClearStatus);
    }

    let mut runtime = ApiRuntime::new(users, client);
    piliseed_tui::run_app(&mut state, &mut runtime, UiOptions { animation })
}

/// Plain-text dump of how a path routes and what the bar looks like there.
fn describe_route(raw: &str) -> String {
    let mut resolver = RouteTabResolver::new();
    let resolution = resolver.resolve(raw);
    let mut navbar = NavigationBarController::default();
    navbar.sync(&resolution);
    let view = navbar.view();

    let mut out = String::new();
    let _ = writeln!(out, "path:    {}", resolution.path);
    let _ = writeln!(out, "page:    {}", resolution.page.title());
    let _ = writeln!(out, "tab:     {}", resolution.tab.as_str());
    let _ = writeln!(
        out,
        "layout:  {}{}",
        view.layout.label(),
        if view.hidden { " (hidden)" } else { "" }
    );
    let _ = writeln!(
        out,
        "bar:     {}px wide, highlight at {}px",
        view.bar_width_px, view.highlight_offset_px
    );
    for button in view.visible_buttons() {
        let target = target_path(button.tab, navbar.mode()).unwrap_or_else(|| "-".to_owned());
        let marker = if button.tab == view.active_tab { "*" } else { " " };
        let _ = writeln!(
            out,
            "  {marker} {:<15} @{:>4}px  -> {target}",
            button.tab.as_str(),
            button.offset_px
        );
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    route: Option<String>,
    resolve: Option<String>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
        route: None,
        resolve: None,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--route" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--route requires a path such as /history"))?;
                options.route = Some(value.as_ref().to_owned());
            }
            "--resolve" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--resolve requires a path such as /history"))?;
                options.resolve = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("piliseed");
    println!("  --config <path>          Use a specific config path");
    println!("  --route <path>           Open at this route instead of [ui].start_route");
    println!("  --resolve <path>         Print the route and nav bar for a path, then exit");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config + DB, then ping the backend");
    println!("  --help                   Show this help");
}
