// ==========================================
// 冷链仓储客户计费结算引擎 - 命令行入口
// ==========================================
// 用法: coldstore-billing <solicitud.json> [--tables <tablas.json>] [--locale <es|zh-CN>] [--json-logs]
// 输入: 自包含结算包 (请求 + 作业记录 + 货品目录 + 库存日报)
// 输出: SettlementOutcome 的 pretty JSON, 失败时退出码非零
// ==========================================

use anyhow::Context;
use chrono::NaiveDate;
use coldstore_billing::domain::{DailyInventory, OperationRecord, SettlementRequest};
use coldstore_billing::engine::{SettlementOrchestrator, SettlementSources};
use coldstore_billing::repository::{
    ArticleSession, InMemoryArticleCatalog, InMemoryInventorySource, InMemoryOperationSource,
};
use coldstore_billing::{i18n, logging, BillingConcept, BillingTables};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// 自包含结算包: 请求参数与全部数据源快照
#[derive(Debug, Deserialize)]
struct SettlementBundle {
    client: String,
    desde: NaiveDate,
    hasta: NaiveDate,
    concepts: Vec<BillingConcept>,
    #[serde(default)]
    operations: Vec<OperationRecord>,
    #[serde(default)]
    articles: Vec<ArticleSession>,
    #[serde(default)]
    inventory: Vec<DailyInventory>,
}

/// 解析好的命令行参数
struct CliArgs {
    request_path: PathBuf,
    tables_path: Option<PathBuf>,
    locale: String,
    json_logs: bool,
}

fn parse_args() -> Option<CliArgs> {
    let mut request_path = None;
    let mut tables_path = None;
    let mut locale = "es".to_string();
    let mut json_logs = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tables" => tables_path = Some(PathBuf::from(args.next()?)),
            "--locale" => locale = args.next()?,
            "--json-logs" => json_logs = true,
            "--help" | "-h" => return None,
            _ if request_path.is_none() => request_path = Some(PathBuf::from(arg)),
            _ => return None,
        }
    }

    Some(CliArgs {
        request_path: request_path?,
        tables_path,
        locale,
        json_logs,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match parse_args() {
        Some(args) => args,
        None => {
            eprintln!("{}", i18n::t("runner.usage"));
            std::process::exit(2);
        }
    };

    i18n::set_locale(&args.locale);
    if args.json_logs {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("==================================================");
    tracing::info!("{}", coldstore_billing::APP_NAME);
    tracing::info!("系统版本: {}", coldstore_billing::VERSION);
    tracing::info!("==================================================");

    // 读取结算包
    let raw = std::fs::read_to_string(&args.request_path).with_context(|| {
        i18n::t_with_args(
            "runner.request_not_found",
            &[("path", &args.request_path.display().to_string())],
        )
    })?;
    let bundle: SettlementBundle =
        serde_json::from_str(&raw).context("结算包 JSON 解析失败")?;

    // 计费规则表: 指定文件或内置默认
    let tables = match &args.tables_path {
        Some(path) => BillingTables::load_from_file(path)?,
        None => BillingTables::default(),
    };

    // 组装内存数据源
    let mut inventory_by_client = HashMap::new();
    inventory_by_client.insert(bundle.client.clone(), bundle.inventory);
    let sources = SettlementSources::new(
        Arc::new(InMemoryOperationSource::new(bundle.operations)),
        Arc::new(InMemoryArticleCatalog::new(bundle.articles)),
        Arc::new(InMemoryInventorySource::new(inventory_by_client)),
    );

    let request = SettlementRequest {
        client: bundle.client,
        desde: bundle.desde,
        hasta: bundle.hasta,
        concepts: bundle.concepts,
    };

    let orchestrator = SettlementOrchestrator::new(sources, Arc::new(tables));
    let outcome = orchestrator.settle(&request).await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if !outcome.success {
        std::process::exit(1);
    }
    tracing::info!(
        "{}",
        i18n::t_with_args("runner.done", &[("rows", &outcome.rows().len().to_string())])
    );
    Ok(())
}
