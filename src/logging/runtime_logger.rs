// src/logging/runtime_logger.rs

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc::{self, Sender, Receiver};
use tokio::task;
use tokio::time::{self, Duration};
use tracing_appender::rolling;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::MakeWriter;
use serde_json::json;
use chrono::Utc;

/// 单条运行日志
pub struct LogEntry {
    pub level: String,
    pub content: String,
}

/// 运行日志管理器：serving 过程日志按级别分流到不同文件，
/// mpsc 批量落盘，后台定时刷新并清理过期文件。
pub struct RuntimeLogger {
    sender: Sender<LogEntry>,
}

impl RuntimeLogger {
    /// - `log_dir`: 日志目录
    /// - `file_prefix`: 文件前缀，如 "serving"（最终文件名形如 serving_info.json）
    /// - `buffer_size`: mpsc 通道容量
    /// - `batch_size`: 单级别批量写入条数
    /// - `flush_interval`: 定时刷盘间隔（毫秒）
    pub fn new(
        log_dir: &str,
        file_prefix: &str,
        buffer_size: usize,
        batch_size: usize,
        flush_interval: u64,
    ) -> Arc<Self> {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let mut log_files = HashMap::new();
        for level in ["DEBUG", "INFO", "WARN", "ERROR"] {
            let file_name = format!("{}_{}.json", file_prefix, level.to_lowercase());
            log_files.insert(
                level.to_string(),
                Arc::new(rolling::hourly(log_dir, &file_name)),
            );
        }

        tokio::spawn(Self::background_writer(
            log_files,
            receiver,
            batch_size,
            flush_interval,
        ));

        {
            // 过期日志清理任务，每小时扫描一次
            let log_dir = log_dir.to_string();
            tokio::spawn(async move {
                let retention_hours = 72;
                loop {
                    Self::cleanup_old_logs(&log_dir, retention_hours).await;
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                }
            });
        }

        Arc::new(Self { sender })
    }

    /// 记录一条运行日志
    pub async fn log(&self, level: &str, message: &str) {
        let content = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "message": message,
        })
        .to_string();

        let entry = LogEntry {
            level: level.to_string(),
            content,
        };
        if let Err(e) = self.sender.send(entry).await {
            eprintln!("Failed to send runtime log message: {}", e);
        }
    }

    async fn background_writer(
        log_files: HashMap<String, Arc<RollingFileAppender>>,
        mut receiver: Receiver<LogEntry>,
        batch_size: usize,
        flush_interval: u64,
    ) {
        let mut buffers: HashMap<String, Vec<String>> = HashMap::new();
        let mut interval = time::interval(Duration::from_millis(flush_interval));
        loop {
            tokio::select! {
                Some(entry) = receiver.recv() => {
                    let buffer = buffers.entry(entry.level.clone()).or_default();
                    buffer.push(entry.content);
                    if buffer.len() >= batch_size {
                        if let Some(appender) = log_files.get(&entry.level) {
                            Self::write_to_disk(appender.clone(), std::mem::take(buffer)).await;
                        }
                    }
                },
                _ = interval.tick() => {
                    for (level, buffer) in buffers.iter_mut() {
                        if !buffer.is_empty() {
                            if let Some(appender) = log_files.get(level) {
                                Self::write_to_disk(appender.clone(), std::mem::take(buffer)).await;
                            }
                        }
                    }
                }
            }
        }
    }

    async fn write_to_disk(file: Arc<RollingFileAppender>, buffer: Vec<String>) {
        let content = buffer.join("\n") + "\n";
        let result = task::spawn_blocking(move || {
            let mut writer = file.make_writer();
            writer.write_all(content.as_bytes())
        })
        .await;
        match result {
            Ok(Err(e)) => eprintln!("Failed to write runtime logs: {}", e),
            Err(e) => eprintln!("Runtime log writer task failed: {}", e),
            _ => {}
        }
    }

    async fn cleanup_old_logs(log_dir: &str, retention_hours: u64) {
        use std::time::{Duration as StdDuration, SystemTime};
        let retention = StdDuration::from_secs(retention_hours * 3600);
        let now = SystemTime::now();
        let mut dir = match tokio::fs::read_dir(log_dir).await {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("Failed to read log directory {}: {}", log_dir, e);
                return;
            }
        };
        while let Ok(Some(entry)) = dir.next_entry().await {
            let path = entry.path();
            if let Ok(metadata) = entry.metadata().await {
                if let Ok(modified) = metadata.modified() {
                    if now.duration_since(modified).unwrap_or_default() > retention {
                        if let Err(e) = tokio::fs::remove_file(&path).await {
                            eprintln!("Failed to delete old log file {:?}: {}", path, e);
                        }
                    }
                }
            }
        }
    }

    /// 停止日志系统，给后台任务留出刷盘时间
    pub async fn shutdown(&self) {
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}
