// src/services/report_service.rs

use chrono::{DateTime, Local, Utc};
use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, LoanRepository},
    middleware::campus::CampusScope,
    models::{inventory::InventoryItem, loan::Loan},
    services::inventory_service::InventoryService,
};

const FONT_FAMILY: &str = "Roboto";

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("Falha ao gerar o PDF: {}", e))
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string()
}

// ---
// CSV
// ---

pub(crate) fn write_inventory_csv(items: &[InventoryItem]) -> Result<Vec<u8>, AppError> {
    let mut csv_data = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut csv_data);

        writer
            .write_record([
                "id", "campus", "setor", "sala", "categoria", "marca", "serie", "patrimonio",
                "status", "responsavel", "fixo", "observacao", "atualizado_em",
            ])
            .map_err(anyhow::Error::from)?;

        for item in items {
            writer
                .write_record([
                    item.id.to_string().as_str(),
                    item.campus_name.as_str(),
                    item.sector_name.as_deref().unwrap_or_default(),
                    item.room.as_deref().unwrap_or_default(),
                    item.category_name.as_deref().unwrap_or_default(),
                    item.brand.as_deref().unwrap_or_default(),
                    item.serial.as_deref().unwrap_or_default(),
                    item.patrimony.as_deref().unwrap_or_default(),
                    item.status.as_str(),
                    item.responsible.as_deref().unwrap_or_default(),
                    if item.is_fixed { "sim" } else { "nao" },
                    item.obs.as_deref().unwrap_or_default(),
                    item.updated_at.to_rfc3339().as_str(),
                ])
                .map_err(anyhow::Error::from)?;
        }

        writer.flush().map_err(anyhow::Error::from)?;
    }
    Ok(csv_data)
}

// ---
// PDF
// ---

/// Conteúdo do QR code do recibo: patrimônio (quando houver) e id do item.
pub(crate) fn receipt_qr_payload(item: &InventoryItem) -> String {
    match item.patrimony.as_deref() {
        Some(patrimony) => format!("{} ({})", patrimony, item.id),
        None => item.id.to_string(),
    }
}

fn qr_image(payload: &str) -> Result<image::DynamicImage, AppError> {
    let code = QrCode::new(payload.as_bytes()).map_err(pdf_error)?;
    let image_buffer = code.render::<Luma<u8>>().build();
    Ok(image::DynamicImage::ImageLuma8(image_buffer))
}

fn new_document(fonts_dir: &Path, title: &str) -> Result<genpdf::Document, AppError> {
    // Carrega a fonte da pasta configurada em REPORT_FONTS_DIR
    let font_family = genpdf::fonts::from_files(fonts_dir, FONT_FAMILY, None).map_err(|e| {
        AppError::InternalServerError(anyhow::anyhow!(
            "Fonte {} não encontrada em {}: {}",
            FONT_FAMILY,
            fonts_dir.display(),
            e
        ))
    })?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(title);
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    doc.push(elements::Paragraph::new(title).styled(style::Style::new().bold().with_font_size(16)));
    doc.push(
        elements::Paragraph::new(format!("Gerado em {}", format_timestamp(Utc::now())))
            .styled(style::Style::new().with_font_size(8)),
    );
    doc.push(elements::Break::new(1.5));
    Ok(doc)
}

fn render(doc: genpdf::Document) -> Result<Vec<u8>, AppError> {
    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(pdf_error)?;
    Ok(buffer)
}

fn render_inventory_pdf(fonts_dir: &Path, items: &[InventoryItem]) -> Result<Vec<u8>, AppError> {
    let mut doc = new_document(fonts_dir, "Relatório de Inventário")?;

    doc.push(elements::Paragraph::new(format!("Total de itens: {}", items.len())));
    doc.push(elements::Break::new(1));

    // Pesos das colunas: Patrimônio, Categoria, Marca, Setor/Sala, Status, Campus
    let mut table = elements::TableLayout::new(vec![2, 2, 2, 3, 2, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let style_bold = style::Style::new().bold().with_font_size(9);
    table
        .row()
        .element(elements::Paragraph::new("Patrimônio").styled(style_bold))
        .element(elements::Paragraph::new("Categoria").styled(style_bold))
        .element(elements::Paragraph::new("Marca").styled(style_bold))
        .element(elements::Paragraph::new("Setor / Sala").styled(style_bold))
        .element(elements::Paragraph::new("Status").styled(style_bold))
        .element(elements::Paragraph::new("Campus").styled(style_bold))
        .push()
        .map_err(pdf_error)?;

    let style_cell = style::Style::new().with_font_size(8);
    for item in items {
        table
            .row()
            .element(elements::Paragraph::new(text(&item.patrimony)).styled(style_cell))
            .element(elements::Paragraph::new(text(&item.category_name)).styled(style_cell))
            .element(elements::Paragraph::new(text(&item.brand)).styled(style_cell))
            .element(
                elements::Paragraph::new(format!("{} / {}", text(&item.sector_name), text(&item.room)))
                    .styled(style_cell),
            )
            .element(elements::Paragraph::new(item.status.as_str()).styled(style_cell))
            .element(elements::Paragraph::new(item.campus_name.as_str()).styled(style_cell))
            .push()
            .map_err(pdf_error)?;
    }

    doc.push(table);
    render(doc)
}

fn render_loan_receipt(fonts_dir: &Path, loan: &Loan, item: &InventoryItem) -> Result<Vec<u8>, AppError> {
    let mut doc = new_document(fonts_dir, "Comprovante de Empréstimo")?;

    let date = |d: chrono::NaiveDate| d.format("%d/%m/%Y").to_string();

    doc.push(elements::Paragraph::new(format!("Empréstimo: {}", loan.id)));
    doc.push(elements::Paragraph::new(format!("Campus: {}", item.campus_name)));
    doc.push(elements::Break::new(1));

    doc.push(elements::Paragraph::new("EQUIPAMENTO").styled(style::Style::new().bold().with_font_size(12)));
    doc.push(elements::Paragraph::new(format!("Patrimônio: {}", text(&item.patrimony))));
    doc.push(elements::Paragraph::new(format!(
        "Categoria: {}  Marca: {}",
        text(&item.category_name),
        text(&item.brand)
    )));
    doc.push(elements::Paragraph::new(format!("Série: {}", text(&item.serial))));
    doc.push(elements::Break::new(1));

    doc.push(elements::Paragraph::new("RESPONSÁVEL").styled(style::Style::new().bold().with_font_size(12)));
    doc.push(elements::Paragraph::new(format!("Nome: {}", loan.borrower_name)));
    doc.push(elements::Paragraph::new(format!("E-mail: {}", text(&loan.borrower_email))));
    doc.push(elements::Paragraph::new(format!("Telefone: {}", text(&loan.borrower_phone))));
    doc.push(elements::Break::new(1));

    doc.push(elements::Paragraph::new(format!("Data do empréstimo: {}", date(loan.loan_date))));
    doc.push(elements::Paragraph::new(format!(
        "Devolução prevista: {}",
        date(loan.expected_return_date)
    )));
    if let Some(returned) = loan.actual_return_date {
        doc.push(elements::Paragraph::new(format!("Devolvido em: {}", date(returned))));
    }
    if let Some(notes) = &loan.notes {
        doc.push(elements::Paragraph::new(format!("Observações: {}", notes)));
    }
    doc.push(elements::Break::new(2));

    let pdf_image = elements::Image::from_dynamic_image(qr_image(&receipt_qr_payload(item))?)
        .map_err(pdf_error)?
        .with_scale(genpdf::Scale::new(0.5, 0.5));
    doc.push(pdf_image);

    doc.push(elements::Break::new(3));
    doc.push(elements::Paragraph::new("_______________________________________"));
    doc.push(elements::Paragraph::new("Assinatura do responsável"));

    render(doc)
}

#[derive(Clone)]
pub struct ReportService {
    inventory_service: InventoryService,
    inventory_repo: InventoryRepository,
    loan_repo: LoanRepository,
    pool: PgPool,
    fonts_dir: PathBuf,
}

impl ReportService {
    pub fn new(
        inventory_service: InventoryService,
        inventory_repo: InventoryRepository,
        loan_repo: LoanRepository,
        pool: PgPool,
        fonts_dir: PathBuf,
    ) -> Self {
        Self { inventory_service, inventory_repo, loan_repo, pool, fonts_dir }
    }

    pub async fn inventory_csv(&self, scope: CampusScope) -> Result<Vec<u8>, AppError> {
        let items = self.inventory_service.export_items(scope).await?;
        write_inventory_csv(&items)
    }

    pub async fn inventory_pdf(&self, scope: CampusScope) -> Result<Vec<u8>, AppError> {
        let items = self.inventory_service.export_items(scope).await?;
        let fonts_dir = self.fonts_dir.clone();

        // genpdf é síncrono e pesado: roda fora do runtime
        tokio::task::spawn_blocking(move || render_inventory_pdf(&fonts_dir, &items))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de geração do PDF: {}", e))?
    }

    pub async fn loan_receipt_pdf(&self, scope: CampusScope, loan_id: Uuid) -> Result<Vec<u8>, AppError> {
        let loan = self
            .loan_repo
            .find(&self.pool, loan_id, scope.campus_id())
            .await?
            .ok_or(AppError::LoanNotFound)?;
        let item = self
            .inventory_repo
            .find_item(&self.pool, loan.item_id, None)
            .await?
            .ok_or(AppError::ItemNotFound)?;
        let fonts_dir = self.fonts_dir.clone();

        tokio::task::spawn_blocking(move || render_loan_receipt(&fonts_dir, &loan, &item))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de geração do PDF: {}", e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::ItemStatus;

    fn item() -> InventoryItem {
        InventoryItem {
            id: Uuid::nil(),
            campus_id: Uuid::nil(),
            campus_name: "Vila Maria".into(),
            sector_name: Some("Secretaria".into()),
            sector_id: None,
            room: Some("Sala 2, bloco B".into()),
            category_id: None,
            category_name: Some("Notebook".into()),
            brand: Some("Lenovo".into()),
            serial: None,
            patrimony: Some("PAT-77".into()),
            status: ItemStatus::Emuso,
            previous_status: None,
            responsible: None,
            obs: None,
            is_fixed: true,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn csv_has_header_and_quotes_commas() {
        let bytes = write_inventory_csv(&[item()]).unwrap();
        let content = String::from_utf8(bytes).unwrap();
        let mut lines = content.lines();

        assert!(lines.next().unwrap().starts_with("id,campus,setor,sala"));
        let row = lines.next().unwrap();
        assert!(row.contains("\"Sala 2, bloco B\""));
        assert!(row.contains(",PAT-77,emuso,,sim,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn qr_payload_prefers_patrimony() {
        let mut it = item();
        assert_eq!(receipt_qr_payload(&it), format!("PAT-77 ({})", Uuid::nil()));
        it.patrimony = None;
        assert_eq!(receipt_qr_payload(&it), Uuid::nil().to_string());
        assert!(qr_image(&receipt_qr_payload(&it)).is_ok());
    }

    #[test]
    fn missing_fonts_is_an_internal_error() {
        let result = render_inventory_pdf(Path::new("/nao/existe"), &[item()]);
        assert!(matches!(result, Err(AppError::InternalServerError(_))));
    }
}
