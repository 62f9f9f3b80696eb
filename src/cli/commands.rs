use clap::{Parser, Subcommand};

/// appenv CLI 应用程序
#[derive(Parser, Debug)]
#[command(name = "appenv")]
#[command(about = "远程应用环境变量同步工具", long_about = None)]
#[command(version)]
pub struct Cli {
    /// 目标应用名称（默认读取 APPENV_APP 或配置中的 default_app）
    #[arg(short, long, global = true)]
    pub app: Option<String>,

    /// 平台 API 地址
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 顶级命令
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 列出所有环境变量
    List {
        /// JSON 格式输出
        #[arg(long)]
        json: bool,
    },
    /// 显示单个环境变量
    Show {
        /// 键
        key: String,
        /// JSON 格式输出
        #[arg(long)]
        json: bool,
    },
    /// 添加环境变量
    Add {
        /// 键
        key: String,
        /// 值
        value: String,
        /// JSON 格式输出
        #[arg(long)]
        json: bool,
    },
    /// 删除一个或多个环境变量
    Remove {
        /// 要删除的键
        #[arg(required = true, num_args = 1..)]
        keys: Vec<String>,
        /// 跳过确认
        #[arg(short, long)]
        yes: bool,
        /// JSON 格式输出
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// 是否请求了 JSON 输出
    pub fn json(&self) -> bool {
        match self {
            Commands::List { json }
            | Commands::Show { json, .. }
            | Commands::Add { json, .. }
            | Commands::Remove { json, .. } => *json,
        }
    }

    /// 用于错误提示的操作名称
    pub fn operation(&self) -> &'static str {
        match self {
            Commands::List { .. } => "列出环境变量",
            Commands::Show { .. } => "查看环境变量",
            Commands::Add { .. } => "添加环境变量",
            Commands::Remove { .. } => "删除环境变量",
        }
    }
}
