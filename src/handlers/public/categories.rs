use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{CategoryInfo, ExpenseCategory};

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryInfo>,
}

/// GET /api/categories - fixed expense categories, in declaration order
pub async fn categories_list() -> ApiResult<CategoriesResponse> {
    let categories = ExpenseCategory::ALL.iter().map(ExpenseCategory::info).collect();
    Ok(ApiResponse::success(CategoriesResponse { categories }).with_message("Categories retrieved successfully"))
}
