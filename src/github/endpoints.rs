// GitHub API endpoint functions.
// Typed, paginated access to a repository's releases.

use std::time::Duration;

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{GitHubRelease, RepoRef};

impl GitHubClient {
    /// Get one page of releases for a repository.
    pub async fn list_releases(
        &mut self,
        repo: &RepoRef,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<GitHubRelease>> {
        let params = [
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        let response = self
            .get_with_params(
                &format!("/repos/{}/{}/releases", repo.owner, repo.name),
                &params,
            )
            .await?;
        let releases: Vec<GitHubRelease> = response.json().await?;
        Ok(releases)
    }

    /// Get every release for a repository, walking pages until a short one.
    ///
    /// `page_delay` is slept between page requests.
    pub async fn list_all_releases(
        &mut self,
        repo: &RepoRef,
        per_page: u32,
        page_delay: Duration,
    ) -> Result<Vec<GitHubRelease>> {
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.list_releases(repo, page, per_page).await?;
            let count = batch.len();
            all.extend(batch);

            if count < per_page as usize {
                break;
            }

            page += 1;
            tokio::time::sleep(page_delay).await;
        }

        tracing::debug!("{}: {} releases over {} page(s)", repo, all.len(), page);
        Ok(all)
    }
}
