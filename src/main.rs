use anyhow::Context;
use clap::Parser;
use copyright_check::{cli, config, error, export, hash_compare, pipeline, scanner};
use cli::{Cli, Commands, ExportFormat};
use config::{AnalysisSettings, Config};
use copyright_check_common::ImageReport;
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::Pipeline;
use std::time::Duration;

const DISCLAIMER: &str = "⚠️ 本ツールは類似性の参考情報を提示するものであり、著作権侵害の有無を法的に保証するものではありません。\n   最終判断は必ず人間が行い、必要に応じて法務専門家にご相談ください。";

fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn print_report(report: &ImageReport, out: &ProgressBar) {
    let rec = report.overall_recommendation();
    let style = report.style();

    out.println(format!("\n■ {}  【{}】", report.filename(), rec.badge()));
    out.println(format!("  {}", rec.message()));
    out.println(format!("  画像の特徴: {}", style.style_description));
    if !style.similar_artists.is_empty() {
        out.println(format!("  似ているアーティスト: {}", style.similar_artists.join("、")));
    }
    for risk in &style.risk_factors {
        out.println(format!("  - {}", risk));
    }

    if report.matches().is_empty() {
        out.println("  似ている画像は見つかりませんでした");
    } else {
        out.println("  ネット上の類似画像:");
        for (i, m) in report.matches().iter().enumerate() {
            out.println(format!("    {}. {} ({}) - {}", i + 1, m.title, m.link, m.source));
        }
    }

    match report.best_similarity() {
        Some(best) => {
            let label = if best.title.is_empty() { &best.url } else { &best.title };
            out.println(format!(
                "  最も似ている画像との一致度: {}% （{}）",
                (best.similarity * 100.0) as i64,
                label
            ));
        }
        None => out.println("  比較できる画像がありませんでした"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Check { paths, threshold, max_results, output, json, excel } => {
            println!("🔍 copyright-check - 画像著作権リスク判定\n");
            println!("{}\n", DISCLAIMER);

            // 設定エラーは画像処理の前に確定させる
            let settings = AnalysisSettings::new(
                threshold.unwrap_or(config.phash_threshold),
                max_results.unwrap_or(config.max_lens_results),
            )?;
            let pipeline = Pipeline::from_config(&config, settings)?;

            let images = scanner::collect_images(&paths)?;
            if images.is_empty() {
                let joined = paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ");
                return Err(error::CopyrightCheckError::NoImagesFound(joined).into());
            }
            let loaded = scanner::load_images(&images)?;
            println!("✔ {}枚の画像を検出 (閾値: {}, 検索件数: {})\n", loaded.len(), settings.threshold.value(), settings.max_results);

            let bar = ProgressBar::new(loaded.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}")
                    .context("プログレスバーの書式が不正です")?,
            );
            bar.enable_steady_tick(Duration::from_millis(120));

            let mut reports = Vec::with_capacity(loaded.len());
            for img in &loaded {
                let report = pipeline
                    .analyze_with_progress(&img.file_name, &img.bytes, |step| {
                        bar.set_message(format!("{}: {}", img.file_name, step.label()));
                    })
                    .await;
                print_report(&report, &bar);
                reports.push(report);
                bar.inc(1);
            }
            bar.finish_with_message("分析完了");

            export::write_csv(&reports, &output)
                .with_context(|| format!("CSVを書き込めません: {}", output.display()))?;
            println!("\n✔ CSV出力: {}", output.display());

            if let Some(json_path) = json {
                export::write_json(&reports, &json_path)?;
                println!("✔ JSON出力: {}", json_path.display());
            }

            if excel {
                let excel_path = output.with_extension("xlsx");
                export::write_excel(&reports, &excel_path)?;
                println!("✔ Excel出力: {}", excel_path.display());
            }

            println!("\n✅ 判定完了");
        }

        Commands::Export { input, format, output } => {
            println!("📄 copyright-check - エクスポート\n");

            let reports = export::read_json(&input)?;
            println!("- {}件のレポートを読み込みました", reports.len());

            let output_dir = output.unwrap_or_else(|| std::path::PathBuf::from("."));
            for path in export::export_reports(&reports, &format, &output_dir)? {
                println!("✔ 出力: {}", path.display());
            }

            if matches!(format, ExportFormat::Csv) {
                println!("  (Excelも必要な場合は --format both)");
            }
            println!("\n✅ エクスポート完了");
        }

        Commands::Compare { image: image_path, url } => {
            let bytes = std::fs::read(&image_path)
                .with_context(|| format!("画像を読み込めません: {}", image_path.display()))?;
            let target = image::load_from_memory(&bytes)
                .map_err(|e| error::CopyrightCheckError::ImageLoad(e.to_string()))?;

            let comparator = hash_compare::PhashComparator::new(Duration::from_secs(config.timeout_seconds))?;
            let similarity = comparator.compare(&target, &url).await;
            if similarity < 0.0 {
                println!("類似度を計算できませんでした: {}", similarity);
            } else {
                println!("pHash類似度: {:.3}", similarity);
            }
        }

        Commands::Config { set_serpapi_key, set_gemini_key, show } => {
            let mut config = config;

            if let Some(key) = set_serpapi_key {
                config.set_serpapi_key(key)?;
                println!("✔ SerpApiのAPIキーを設定しました");
            }

            if let Some(key) = set_gemini_key {
                config.set_gemini_key(key)?;
                println!("✔ GeminiのAPIキーを設定しました");
            }

            if show {
                let status = |ok: bool| if ok { "設定済み" } else { "未設定" };
                println!("設定:");
                println!("  モデル: {}", config.gemini_model);
                println!("  pHash類似度閾値: {}", config.phash_threshold);
                println!("  Lens検索件数: {}", config.max_lens_results);
                println!("  サムネイル取得タイムアウト: {}秒", config.timeout_seconds);
                println!("  SerpApi APIキー: {}", status(config.get_serpapi_key().is_ok()));
                println!("  Gemini APIキー: {}", status(config.get_gemini_key().is_ok()));
            }
        }
    }

    Ok(())
}
