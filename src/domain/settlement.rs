// ==========================================
// 冷链仓储计费结算 - 结算输出领域模型
// ==========================================
// 结算行一次创建不再修改, 全量生成后统一排序
// ==========================================

use crate::domain::concept::BillingConcept;
use crate::domain::operation::FormOperation;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// 本地日历换算
// ==========================================

/// 仓储本地挂钟时间（固定 UTC-5, 无夏令时）
pub fn local_datetime(fecha: &DateTime<Utc>) -> NaiveDateTime {
    (*fecha + Duration::hours(crate::LOCAL_UTC_OFFSET_HOURS as i64)).naive_utc()
}

/// 仓储本地日历日
pub fn local_date(fecha: &DateTime<Utc>) -> NaiveDate {
    local_datetime(fecha).date()
}

// ==========================================
// SettlementRequest - 结算请求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRequest {
    pub client: String,                // 客户编码
    pub desde: NaiveDate,              // 起始日（含, 本地日历）
    pub hasta: NaiveDate,              // 截止日（含, 本地日历）
    pub concepts: Vec<BillingConcept>, // 本次参与结算的概念
}

impl SettlementRequest {
    /// 作业时间是否落入结算区间（按本地日历日）
    pub fn contains(&self, fecha: &DateTime<Utc>) -> bool {
        let d = local_date(fecha);
        d >= self.desde && d <= self.hasta
    }

    /// 区间内逐日遍历
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.desde.iter_days().take_while(move |d| *d <= self.hasta)
    }
}

// ==========================================
// SettlementRow - 结算行
// ==========================================
// valor_total = cantidad * valor_unitario, 不做额外舍入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRow {
    // ===== 计费主体 =====
    pub fecha: NaiveDate,             // 计费日（本地日历）
    pub concepto: String,             // 概念名称
    #[serde(default)]
    pub sub_concepto: Option<String>, // 子概念（专项费率名 / 角色班次标签）
    pub cantidad: f64,                // 数量
    pub unidad_medida: String,        // 计量单位文本
    pub valor_unitario: f64,          // 单价
    pub valor_total: f64,             // 金额

    // ===== 作业上下文 =====
    #[serde(default)]
    pub placa: String, // 车牌号
    #[serde(default)]
    pub contenedor: String, // 集装箱号
    #[serde(default)]
    pub camara: String, // 存储区
    #[serde(default)]
    pub operacion_logistica: String, // 物流方向文本（RECEPCION/DESPACHO/...）
    #[serde(default)]
    pub pedido_sislog: String, // SISLOG 订单号
    #[serde(default)]
    pub total_paletas: f64, // 作业托盘合计（参考列）
    #[serde(default)]
    pub tipo_vehiculo: String, // 车型

    // ===== 时段与人力（装卸队概念）=====
    #[serde(default)]
    pub hora_inicio: Option<String>, // 开始时刻
    #[serde(default)]
    pub hora_fin: Option<String>, // 结束时刻
    #[serde(default)]
    pub numero_personas: Option<u32>, // 人数
}

impl SettlementRow {
    /// 创建结算行, 上下文列取空默认
    pub fn new(
        fecha: NaiveDate,
        concepto: &str,
        cantidad: f64,
        unidad_medida: &str,
        valor_unitario: f64,
    ) -> Self {
        SettlementRow {
            fecha,
            concepto: concepto.to_string(),
            sub_concepto: None,
            cantidad,
            unidad_medida: unidad_medida.to_string(),
            valor_unitario,
            valor_total: cantidad * valor_unitario,
            placa: String::new(),
            contenedor: String::new(),
            camara: String::new(),
            operacion_logistica: String::new(),
            pedido_sislog: String::new(),
            total_paletas: 0.0,
            tipo_vehiculo: String::new(),
            hora_inicio: None,
            hora_fin: None,
            numero_personas: None,
        }
    }

    /// 回填表单上下文列
    pub fn fill_form_context(&mut self, op: &FormOperation, camara: &str, total_paletas: f64) {
        self.placa = op.placa.clone().unwrap_or_default();
        self.contenedor = op.contenedor.clone().unwrap_or_default();
        self.camara = camara.to_string();
        self.operacion_logistica = op.form_kind.flow_label().to_string();
        self.pedido_sislog = op.pedido_sislog.clone().unwrap_or_default();
        self.total_paletas = total_paletas;
        self.tipo_vehiculo = op.tipo_vehiculo.clone().unwrap_or_default();
        self.hora_inicio = op.hora_inicio.clone();
        self.hora_fin = op.hora_fin.clone();
    }
}

// ==========================================
// DailyInventory - 库存日报行
// ==========================================
// 外部对账报表的逐日存储货位数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyInventory {
    pub fecha: NaiveDate, // 报表日
    pub posiciones: f64,  // 占用货位数
    #[serde(default)]
    pub camara: Option<String>, // 存储区标识
}
