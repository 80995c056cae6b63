use anyhow::{Context, Result};
use log::info;

use crate::tempo::TempoRepository;
use crate::worklog::Worklog;

/// worklogを1件削除するためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct DeleteArgs {
    #[clap(help = "Id of the worklog to delete, shown by tempor list")]
    worklog_id: i64,
}

pub struct DeleteCommand<'a, T: TempoRepository> {
    tempo: &'a T,
}

impl<'a, T: TempoRepository> DeleteCommand<'a, T> {
    /// 新しい`DeleteCommand`を返す。
    pub fn new(tempo: &'a T) -> Self {
        Self { tempo }
    }

    /// `delete`サブコマンドの処理を行う。
    ///
    /// 削除した内容を表示できるように、削除の前にworklogを取得する。
    ///
    /// # Arguments
    ///
    /// * `delete` - `delete`サブコマンドの引数
    pub async fn run(&self, delete: DeleteArgs) -> Result<Worklog> {
        let entity = self
            .tempo
            .get_worklog(delete.worklog_id)
            .await
            .with_context(|| format!("Failed to retrieve worklog {}", delete.worklog_id))?;
        let worklog = Worklog::from_entity(&entity);

        self.tempo
            .delete_worklog(delete.worklog_id)
            .await
            .with_context(|| format!("Failed to delete worklog {}", delete.worklog_id))?;
        info!("Worklog {} deleted successfully.", delete.worklog_id);

        Ok(worklog)
    }
}
