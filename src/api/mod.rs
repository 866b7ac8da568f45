/*
 * Responsibility
 * - HTTP API の公開インターフェース
 * - crud: resource の route 登録ヘルパー
 * - extractors: gate が publish した TokenCtx を handler で受け取る
 * - v1 / v2: versioning で振り分けられる各バージョンの routes
 */
pub mod crud;
pub mod extractors;
pub mod v1;
pub mod v2;
