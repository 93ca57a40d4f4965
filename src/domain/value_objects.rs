use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 貸出ID - 貸出管理コンテキストの集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(Uuid);

impl LoanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}

/// 書籍ID - カタログ管理コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

/// 借り手名のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowerError {
    /// 空文字列
    Empty,
    /// 上限（100文字）を超えた
    TooLong,
}

/// 借り手名
///
/// 不変条件：空でなく、100文字以内。
/// 型システムでこの制約を強制し、不正な値を作成できないようにする。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower(String);

impl Borrower {
    pub const MAX_LEN: usize = 100;

    /// バリデーション付きで作成
    ///
    /// # エラー
    /// 空白のみの場合は`BorrowerError::Empty`、
    /// 100文字を超える場合は`BorrowerError::TooLong`を返す
    pub fn new(name: impl Into<String>) -> Result<Self, BorrowerError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BorrowerError::Empty);
        }
        if name.chars().count() > Self::MAX_LEN {
            return Err(BorrowerError::TooLong);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// コメントのエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentsError {
    /// 上限（500文字）を超えた
    TooLong,
}

/// 貸出・返却時の自由記述コメント
///
/// 不変条件：500文字以内。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comments(String);

impl Comments {
    pub const MAX_LEN: usize = 500;

    pub fn new(text: impl Into<String>) -> Result<Self, CommentsError> {
        let text = text.into();
        if text.chars().count() > Self::MAX_LEN {
            return Err(CommentsError::TooLong);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 空白のみか（返却時のコメント上書き判定に使用）
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// 貸出期間のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanPeriodError {
    /// 1〜365日の範囲外
    OutOfRange,
}

/// 貸出期間（日数）
///
/// 不変条件：1日以上365日以内。
/// 期間が1日以上のため、返却期限は必ず貸出日より後になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanPeriod(u16);

impl LoanPeriod {
    pub const MIN_DAYS: u16 = 1;
    pub const MAX_DAYS: u16 = 365;
    /// 省略時の貸出期間
    pub const DEFAULT_DAYS: u16 = 14;

    pub fn new(days: u16) -> Result<Self, LoanPeriodError> {
        if !(Self::MIN_DAYS..=Self::MAX_DAYS).contains(&days) {
            return Err(LoanPeriodError::OutOfRange);
        }
        Ok(Self(days))
    }

    pub fn days(&self) -> u16 {
        self.0
    }

    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.0))
    }
}

impl Default for LoanPeriod {
    fn default() -> Self {
        Self(Self::DEFAULT_DAYS)
    }
}
