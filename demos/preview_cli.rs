use clap::{Arg, ArgAction, Command};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use url_preview_card::{
    Fetcher, LinkPreview, Phase, PreviewCard, RequestOptions, VisualChoice,
};

fn print_card(source: &str, card: &PreviewCard) {
    println!("\n{}", "Link Preview".bold().blue());
    println!("{}", "---------------".blue());
    println!("{}: {}", "Source".bold(), source);

    if let Some(title) = &card.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(subtitle) = &card.subtitle {
        println!("{}: {}", "Site".bold(), subtitle);
    }
    if let Some(description) = &card.description {
        let short: String = description.chars().take(100).collect();
        println!("{}: {}", "Description".bold(), short);
    }

    let visual = match &card.visual {
        VisualChoice::Svg { url } => format!("svg {url}"),
        VisualChoice::Image { url } => format!("image {url}"),
        VisualChoice::Favicon { url } => format!("favicon {url}"),
        VisualChoice::Placeholder => "placeholder".to_string(),
    };
    println!("{}: {}", "Visual".bold(), visual);
    println!(
        "{}: {}",
        "Opens".bold(),
        card.tap_target.as_deref().unwrap_or("(nothing)")
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let matches = Command::new("preview_cli")
        .about("Resolve link preview cards for URLs or text containing URLs")
        .arg(
            Arg::new("source")
                .required(true)
                .num_args(1..)
                .help("URL, or quoted text containing a URL"),
        )
        .arg(
            Arg::new("header")
                .long("header")
                .short('H')
                .action(ArgAction::Append)
                .help("Extra request header as name:value"),
        )
        .arg(
            Arg::new("images-property-type")
                .long("images-property-type")
                .help("Meta property prefix for images, e.g. twitter"),
        )
        .arg(
            Arg::new("proxy-url")
                .long("proxy-url")
                .help("Prefix prepended to every fetched URL"),
        )
        .get_matches();

    let mut options = RequestOptions::default();
    if let Some(headers) = matches.get_many::<String>("header") {
        for header in headers {
            match header.split_once(':') {
                Some((name, value)) => options = options.with_header(name.trim(), value.trim()),
                None => eprintln!("{}: ignoring header {header}", "Warning".yellow()),
            }
        }
    }
    if let Some(property_type) = matches.get_one::<String>("images-property-type") {
        options = options.with_images_property_type(property_type.clone());
    }
    if let Some(proxy_url) = matches.get_one::<String>("proxy-url") {
        options = options.with_proxy_url(proxy_url.clone());
    }

    let sources: Vec<String> = matches
        .get_many::<String>("source")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let pb = ProgressBar::new(sources.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    let mut preview = LinkPreview::new(Fetcher::new()).with_request_options(options);

    for source in sources {
        let phase = preview.resolve(Some(source.clone().into())).await;
        pb.inc(1);

        match (phase, preview.card()) {
            (Phase::Resolved, Some(card)) => pb.suspend(|| print_card(&source, &card)),
            _ => {
                let reason = preview
                    .last_error()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "nothing to show".to_string());
                pb.suspend(|| eprintln!("{}: {} - {}", "Error".bold().red(), source, reason));
            }
        }
    }

    pb.finish_with_message("All sources processed!");
    Ok(())
}
