// ==========================================
// 冷链仓储计费结算 - 业务参数表
// ==========================================
// 历史上散落在结算代码里的命名表, 统一收敛为可注入配置
// Default = 生产现值; CLI 可用 JSON 覆盖, 测试可按场景注入
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::Path;

// ==========================================
// 专项客户规则
// ==========================================

/// 批次冻结客户规则
///
/// 入库批次先收一次冻结费, 宽限期满后按日收仓储费,
/// 直到该批次出库或结算区间结束
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotFreezingRules {
    /// 适用客户编码
    pub client: String,

    /// 冻结服务概念名称
    pub freezing_concept: String,

    /// 冻结后仓储概念名称
    pub storage_concept: String,

    /// 仓储宽限天数（入库当日起算, 宽限期内不计仓储费）
    pub storage_grace_days: i64,
}

impl Default for LotFreezingRules {
    fn default() -> Self {
        LotFreezingRules {
            client: "830512774".to_string(),
            freezing_concept: "SERVICIO DE CONGELACION".to_string(),
            storage_concept: "ALMACENAMIENTO POST CONGELACION".to_string(),
            storage_grace_days: 2,
        }
    }
}

/// 货筐装车客户规则
///
/// 单价按整单吨位档位取区间表白班列, 数量按货筐数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketLoadingRules {
    /// 适用客户编码
    pub client: String,

    /// 货筐装车概念名称
    pub concept: String,
}

impl Default for BasketLoadingRules {
    fn default() -> Self {
        BasketLoadingRules {
            client: "860034959".to_string(),
            concept: "CARGUE CANASTILLAS".to_string(),
        }
    }
}

/// 专项客户登记表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecialClientRegistry {
    #[serde(default)]
    pub lot_freezing: LotFreezingRules,

    #[serde(default)]
    pub basket_loading: BasketLoadingRules,
}

// ==========================================
// BillingTables - 业务参数表
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingTables {
    /// 概念展示优先级（排序第二键; 未列出的概念排最后, 相对次序保持稳定）
    #[serde(default = "default_concept_priority")]
    pub concept_priority: Vec<String>,

    /// 装卸队角色优先级（加班概念排序第三键, 按子概念前缀匹配）
    #[serde(default = "default_role_priority")]
    pub role_priority: Vec<String>,

    /// 班次豁免概念（分班恒为 NO_APLICA）
    #[serde(default = "default_shift_exempt")]
    pub shift_exempt_concepts: Vec<String>,

    /// 按趟计费概念（数量恒为 1, 计量单位改为按趟单位）
    #[serde(default = "default_per_trip")]
    pub per_trip_concepts: Vec<String>,

    /// 按趟计费的计量单位文本
    #[serde(default = "default_per_trip_unit")]
    pub per_trip_unit: String,

    /// 固定货位包月概念（数量 = 基准数量 x 当月天数）
    #[serde(default = "default_fixed_positions_concept")]
    pub fixed_positions_concept: String,

    /// 固定装卸队加班概念（人数取费率目录基准数量）
    #[serde(default = "default_time_extra_fixed")]
    pub time_extra_fixed_concept: String,

    /// 临时装卸队加班概念（人数取作业登记的角色人数）
    #[serde(default = "default_time_extra_adhoc")]
    pub time_extra_adhoc_concept: String,

    /// 出库件数不限拣选行的客户（默认仅拣选行计件）
    #[serde(default = "default_dispatch_all_items_clients")]
    pub dispatch_units_all_items_clients: Vec<String>,

    /// 隧道冻结订单类型（按车辆分组计托的识别依据）
    #[serde(default = "default_tunnel_pedido_type")]
    pub tunnel_pedido_type: String,

    /// 隧道冻结概念名称（逐车出净重行）
    #[serde(default = "default_tunnel_concept")]
    pub tunnel_concept: String,

    /// 双存储区哨兵值（filter_sesion 取此值时不过滤存储区）
    #[serde(default = "default_session_both")]
    pub session_both: String,

    /// 专项客户登记表
    #[serde(default)]
    pub special_clients: SpecialClientRegistry,
}

fn default_concept_priority() -> Vec<String> {
    [
        "ALMACENAMIENTO CONGELADOS",
        "ALMACENAMIENTO REFRIGERADOS",
        "ALMACENAMIENTO CONTENEDOR",
        "POSICIONES FIJAS CONGELADOS",
        "SERVICIO DE CONGELACION",
        "ALMACENAMIENTO POST CONGELACION",
        "TUNEL DE CONGELACION",
        "CARGUE",
        "DESCARGUE",
        "CARGUE CANASTILLAS",
        "MANIPULACION ENTRADA",
        "MANIPULACION SALIDA",
        "PICKING",
        "HORA EXTRA CUADRILLA FIJA",
        "HORA EXTRA CUADRILLA ADICIONAL",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_role_priority() -> Vec<String> {
    ["SUPERVISOR", "MONTACARGUISTA", "OPERARIO", "AUXILIAR"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_shift_exempt() -> Vec<String> {
    [
        "ALMACENAMIENTO CONGELADOS",
        "ALMACENAMIENTO REFRIGERADOS",
        "ALMACENAMIENTO CONTENEDOR",
        "TUNEL DE CONGELACION",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_per_trip() -> Vec<String> {
    ["CARGUE", "DESCARGUE"].iter().map(|s| s.to_string()).collect()
}

fn default_per_trip_unit() -> String {
    "VIAJE".to_string()
}

fn default_fixed_positions_concept() -> String {
    "POSICIONES FIJAS CONGELADOS".to_string()
}

fn default_time_extra_fixed() -> String {
    "HORA EXTRA CUADRILLA FIJA".to_string()
}

fn default_time_extra_adhoc() -> String {
    "HORA EXTRA CUADRILLA ADICIONAL".to_string()
}

fn default_dispatch_all_items_clients() -> Vec<String> {
    vec!["900415361".to_string()]
}

fn default_tunnel_pedido_type() -> String {
    "TUNEL".to_string()
}

fn default_tunnel_concept() -> String {
    "TUNEL DE CONGELACION".to_string()
}

fn default_session_both() -> String {
    "AMBAS".to_string()
}

impl Default for BillingTables {
    fn default() -> Self {
        BillingTables {
            concept_priority: default_concept_priority(),
            role_priority: default_role_priority(),
            shift_exempt_concepts: default_shift_exempt(),
            per_trip_concepts: default_per_trip(),
            per_trip_unit: default_per_trip_unit(),
            fixed_positions_concept: default_fixed_positions_concept(),
            time_extra_fixed_concept: default_time_extra_fixed(),
            time_extra_adhoc_concept: default_time_extra_adhoc(),
            dispatch_units_all_items_clients: default_dispatch_all_items_clients(),
            tunnel_pedido_type: default_tunnel_pedido_type(),
            tunnel_concept: default_tunnel_concept(),
            session_both: default_session_both(),
            special_clients: SpecialClientRegistry::default(),
        }
    }
}

impl BillingTables {
    /// 从 JSON 文件加载（缺省字段回落生产现值）
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let tables: BillingTables = serde_json::from_str(&text)?;
        Ok(tables)
    }

    /// 概念在优先级表中的名次, 未列出排最后
    pub fn concept_rank(&self, concepto: &str) -> usize {
        self.concept_priority
            .iter()
            .position(|c| c == concepto)
            .unwrap_or(self.concept_priority.len())
    }

    /// 子概念按角色前缀匹配的名次, 无匹配排最后
    ///
    /// 加班概念的子概念形如 "MONTACARGUISTA NOCTURNA"
    pub fn role_rank(&self, sub_concepto: &str) -> usize {
        let label = sub_concepto.trim().to_uppercase();
        self.role_priority
            .iter()
            .position(|rol| label.starts_with(rol.to_uppercase().as_str()))
            .unwrap_or(self.role_priority.len())
    }

    /// 概念是否豁免分班
    pub fn is_shift_exempt(&self, concepto: &str) -> bool {
        self.shift_exempt_concepts.iter().any(|c| c == concepto)
    }

    /// 概念是否按趟计费
    pub fn is_per_trip(&self, concepto: &str) -> bool {
        self.per_trip_concepts.iter().any(|c| c == concepto)
    }

    /// 概念是否装卸队加班（固定或临时）
    pub fn is_time_extra(&self, concepto: &str) -> bool {
        concepto == self.time_extra_fixed_concept || concepto == self.time_extra_adhoc_concept
    }

    /// 出库件数是否不限拣选行
    pub fn dispatch_counts_all_items(&self, client: &str) -> bool {
        self.dispatch_units_all_items_clients
            .iter()
            .any(|c| c == client)
    }

    /// 存储区过滤值是否为双区哨兵
    pub fn is_session_both(&self, sesion: &str) -> bool {
        sesion.trim().eq_ignore_ascii_case(&self.session_both)
    }
}
