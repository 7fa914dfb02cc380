// ==========================================
// 杂货库存管理系统 - 命令行主入口
// ==========================================
// 每条命令即一次请求: 打开 RequestContext → 调用 API → 渲染输出
// 输出: stdout 为渲染结果，stderr 为日志与错误
// ==========================================

use backstock::api::{parse_sections, ApiError, ApiResult, ConfigApi};
use backstock::config::{get_default_db_path, AppEnvironment};
use backstock::presentation::{render, Rendered, View};
use backstock::{
    i18n, logging, AppState, HealthApi, ImportApi, InventoryApi, RawItemRecord, ReportApi,
    ReportFilter, Representation, RequestContext,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Instrument;

#[derive(Parser)]
#[command(name = "backstock", version)]
#[command(about = "杂货库存管理: 检索 / 录入 / 批量导入 / 统计报表", long_about = None)]
struct Cli {
    /// 数据库文件（默认 BACKSTOCK_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 输出格式: html / json
    #[arg(long, global = true, default_value = "html")]
    format: Representation,

    /// 界面语言（覆盖 ui.locale 配置）
    #[arg(long, global = true)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 初始化数据库
    Init,

    /// 按字段检索商品
    Search {
        /// 检索字段（id / description / department / price / ...）
        criterion: String,
        /// 检索值
        value: String,
    },

    /// 新增商品
    Add(ItemArgs),

    /// 修改商品
    Update(ItemArgs),

    /// 查看单个商品
    Show { id: i64 },

    /// 删除商品
    Delete { id: i64 },

    /// 导入 CSV / XLSX / XLS 文件
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// 最近的导入批次
    Batches {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// 导入批次的拒绝明细
    Rejections { batch_id: String },

    /// 统计报表
    Report {
        /// 仅统计指定部门
        #[arg(long)]
        department: Option<String>,

        /// 需要的分区，可重复（默认全部）
        #[arg(long = "section", value_name = "SECTION")]
        sections: Vec<String>,
    },

    /// 健康检查
    Health,

    /// 诊断信息
    Diagnostics,

    /// 查看或修改配置
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// 设置配置值
    Set { key: String, value: String },
    /// 恢复默认值
    Reset { key: String },
}

/// 商品字段（与导入文件列一致，原样交给清洗/校验）
#[derive(Args)]
struct ItemArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    shelf_life: String,
    #[arg(long)]
    price: String,
    #[arg(long)]
    cost: String,
    #[arg(long)]
    unit: String,
    #[arg(long, default_value = "1")]
    x_for: String,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    last_sold: Option<String>,
    #[arg(long)]
    quantity: Option<String>,
    #[arg(long)]
    reorder_point: Option<String>,
    #[arg(long)]
    date_added: Option<String>,
}

impl From<ItemArgs> for RawItemRecord {
    fn from(args: ItemArgs) -> Self {
        RawItemRecord {
            id: Some(args.id),
            description: Some(args.description),
            last_sold: args.last_sold,
            shelf_life: Some(args.shelf_life),
            department: args.department,
            price: Some(args.price),
            unit: Some(args.unit),
            x_for: Some(args.x_for),
            cost: Some(args.cost),
            quantity: args.quantity,
            reorder_point: args.reorder_point,
            date_added: args.date_added,
            row_number: 0,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let environment = AppEnvironment::from_env();
    if environment.use_json_logs() {
        logging::init_json();
    } else {
        logging::init();
    }
    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    let state = AppState::new(db_path, environment);

    let format = cli.format;
    let (output, errors) = match run(cli, &state).await {
        Ok(output) => (Some(output.rendered), output.errors),
        Err(err) => (None, vec![err]),
    };

    if let Some(rendered) = output.filter(|r| !r.body.is_empty()) {
        println!("{}", rendered.body);
    }
    let mut code = 0u8;
    for err in &errors {
        code = code.max(report_error(err, format)?);
    }
    Ok(ExitCode::from(code))
}

/// 命令输出: 渲染结果 + 不影响其余部分的错误（如批量导入中的单个文件）
struct Output {
    rendered: Rendered,
    errors: Vec<ApiError>,
}

impl From<Rendered> for Output {
    fn from(rendered: Rendered) -> Self {
        Self {
            rendered,
            errors: Vec::new(),
        }
    }
}

/// 记录并输出错误视图，返回退出码（1: 输入错误，2: 其他）
fn report_error(err: &ApiError, format: Representation) -> anyhow::Result<u8> {
    if err.is_client_error() {
        tracing::warn!(kind = err.kind(), error = %err, "请求被拒绝");
    } else {
        tracing::error!(kind = err.kind(), error = %err, "请求失败");
    }
    let rendered = render(&err.to_view(), format)?;
    eprintln!("{}", rendered.body);
    Ok(if err.is_client_error() { 1 } else { 2 })
}

/// 打开请求上下文并应用界面语言
fn begin(state: &AppState, operation: &'static str, locale: Option<&str>) -> ApiResult<RequestContext> {
    let ctx = state.begin_request(operation)?;
    i18n::set_locale(locale.unwrap_or(ctx.config().locale.as_str()));
    Ok(ctx)
}

fn respond<V: View>(view: &V, format: Representation) -> ApiResult<Rendered> {
    render(view, format).map_err(|e| ApiError::Internal(e.to_string()))
}

async fn run(cli: Cli, state: &AppState) -> ApiResult<Output> {
    let format = cli.format;
    let locale = cli.locale.as_deref();

    // 建表幂等，任何命令都可直接作用于新数据库
    state.init_database()?;

    let rendered = match cli.command {
        Commands::Init => {
            let ctx = begin(state, "init", locale)?;
            let _enter = ctx.span().enter();
            respond(&HealthApi::new(state, &ctx)?.health()?, format)
        }
        Commands::Search { criterion, value } => {
            let ctx = begin(state, "search", locale)?;
            let _enter = ctx.span().enter();
            respond(&InventoryApi::new(&ctx).search(&criterion, &value)?, format)
        }
        Commands::Add(args) => {
            let ctx = begin(state, "add_item", locale)?;
            let _enter = ctx.span().enter();
            respond(&InventoryApi::new(&ctx).add_item(args.into())?, format)
        }
        Commands::Update(args) => {
            let ctx = begin(state, "update_item", locale)?;
            let _enter = ctx.span().enter();
            respond(&InventoryApi::new(&ctx).update_item(args.into())?, format)
        }
        Commands::Show { id } => {
            let ctx = begin(state, "get_item", locale)?;
            let _enter = ctx.span().enter();
            respond(&InventoryApi::new(&ctx).get_item(id)?, format)
        }
        Commands::Delete { id } => {
            let ctx = begin(state, "delete_item", locale)?;
            let _enter = ctx.span().enter();
            respond(&InventoryApi::new(&ctx).delete_item(id)?, format)
        }
        Commands::Import { files } => {
            let ctx = begin(state, "import", locale)?;
            let results = ImportApi::new(&ctx)
                .import_files(files)
                .instrument(ctx.span().clone())
                .await;

            // 逐文件输出，失败的文件不影响其余文件
            let mut bodies = Vec::with_capacity(results.len());
            let mut errors = Vec::new();
            for result in results {
                match result {
                    Ok(result) => bodies.push(respond(&result, format)?.body),
                    Err(err) => errors.push(err),
                }
            }
            return Ok(Output {
                rendered: Rendered {
                    content_type: format.content_type(),
                    body: bodies.join("\n"),
                },
                errors,
            });
        }
        Commands::Batches { limit } => {
            let ctx = begin(state, "list_batches", locale)?;
            let view = ImportApi::new(&ctx)
                .list_batches(limit)
                .instrument(ctx.span().clone())
                .await?;
            respond(&view, format)
        }
        Commands::Rejections { batch_id } => {
            let ctx = begin(state, "get_rejections", locale)?;
            let view = ImportApi::new(&ctx)
                .get_rejections(&batch_id)
                .instrument(ctx.span().clone())
                .await?;
            respond(&view, format)
        }
        Commands::Report { department, sections } => {
            let ctx = begin(state, "report", locale)?;
            let _enter = ctx.span().enter();
            let filter = ReportFilter {
                department,
                sections: parse_sections(&sections)?,
            };
            ReportApi::new(&ctx).render(&filter, format)
        }
        Commands::Health => {
            let ctx = begin(state, "health", locale)?;
            let _enter = ctx.span().enter();
            respond(&HealthApi::new(state, &ctx)?.health()?, format)
        }
        Commands::Diagnostics => {
            let ctx = begin(state, "diagnostics", locale)?;
            let view = HealthApi::new(state, &ctx)?
                .diagnostics()
                .instrument(ctx.span().clone())
                .await?;
            respond(&view, format)
        }
        Commands::Config { action } => {
            let ctx = begin(state, "config", locale)?;
            let _enter = ctx.span().enter();
            let api = ConfigApi::new(&ctx);
            let view = match action {
                None => api.list_configs()?,
                Some(ConfigAction::Set { key, value }) => api.update_config(&key, &value)?,
                Some(ConfigAction::Reset { key }) => api.reset_config(&key)?,
            };
            respond(&view, format)
        }
    }?;
    Ok(rendered.into())
}
