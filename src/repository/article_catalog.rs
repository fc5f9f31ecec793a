// ==========================================
// 冷链仓储计费结算 - 货品目录接口
// ==========================================

/// 货品目录: 货品编码 → 存储区归属
///
/// 概念的存储区过滤 (filter_sesion) 依赖此查询;
/// 目录查不到的货品视为不属于任何存储区, 被过滤掉
pub trait ArticleCatalog: Send + Sync {
    /// 货品编码所属存储区（如 CONGELADOS / REFRIGERADOS）
    fn session_of(&self, codigo_producto: &str) -> Option<String>;
}
