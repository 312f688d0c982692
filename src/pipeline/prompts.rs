//! Stage Prompts and Response Schemas
//!
//! System prompts, response schemas and user-prompt builders for the
//! model-backed stages. All prompts and model-facing instructions are in
//! Portuguese; the documents under analysis are Brazilian editais.

use serde_json::{Value, json};

// =============================================================================
// System Prompts
// =============================================================================

pub const SUMMARY_SYSTEM: &str = "\
Você é um especialista em análise de documentos de licitação. \
Sua função é gerar um resumo detalhado e estruturado do edital, incluindo: \
objeto da licitação, quantidades mencionadas, especificações técnicas relevantes, \
prazos e valores, e outras informações importantes. \
O resumo deve ser claro, conciso e conter todas as informações relevantes \
para a tomada de decisão. O resumo DEVE ser em português.";

pub const TARGET_SYSTEM: &str = "\
Você é um especialista em análise de documentos de licitação. \
Sua função é determinar se um documento é relevante para um alvo específico. \
Para dispositivos, verifique se o documento menciona o dispositivo ou similar. \
Para serviços, verifique se o serviço está relacionado ao alvo. \
Considere sinônimos e termos equivalentes ao alvo.";

pub const QUANTITY_SYSTEM: &str = "\
Você é um especialista em análise de documentos de licitação. \
Sua função é identificar a quantidade total de unidades do item alvo \
mencionada no trecho fornecido. Considere unidades como unidade, peça, \
kit, lote e conjunto. Se o trecho não mencionar quantidade do item alvo, \
retorne total_quantity igual a 0.";

pub const JUSTIFICATION_SYSTEM: &str = "\
Você é um especialista em análise de documentos de licitação. \
Sua função é gerar uma justificativa clara e coerente para a decisão \
de relevância do edital. A justificativa deve explicar por que o edital \
é ou não relevante; se relevante, destacar os pontos que o tornam relevante; \
se não relevante, explicar por que não atende aos critérios; em caso de \
volume mínimo exigido, explicar a análise da quantidade. \
A justificativa DEVE ser em português, objetiva e baseada apenas no \
conteúdo fornecido. NÃO inclua texto em inglês.";

// =============================================================================
// Response Schemas
// =============================================================================

pub fn summary_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "string",
                "description": "Resumo estruturado do edital em português"
            },
            "title": {
                "type": "string",
                "description": "Título do edital"
            },
            "city": {
                "type": "string",
                "description": "Cidade/UF do órgão licitante"
            },
            "phone": {
                "type": "string",
                "description": "Telefone de contato do órgão"
            },
            "website": {
                "type": "string",
                "description": "Website do órgão ou do processo"
            },
            "email": {
                "type": "string",
                "description": "E-mail de contato do órgão"
            },
            "object": {
                "type": "string",
                "description": "Objeto da licitação"
            },
            "quantities": {
                "type": "string",
                "description": "Quantidades mencionadas no edital"
            },
            "specifications": {
                "type": "string",
                "description": "Especificações técnicas relevantes"
            },
            "deadlines": {
                "type": "string",
                "description": "Prazos importantes"
            },
            "values": {
                "type": "string",
                "description": "Valores relevantes"
            }
        },
        "required": ["summary"]
    })
}

pub fn target_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "target_match": {
                "type": "boolean",
                "description": "true se o documento é relevante para o alvo"
            },
            "reason": {
                "type": "string",
                "description": "Breve explicação da decisão"
            }
        },
        "required": ["target_match"]
    })
}

pub fn quantity_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "total_quantity": {
                "type": "integer",
                "minimum": 0,
                "description": "Quantidade total de unidades do item alvo no trecho"
            },
            "unit": {
                "type": "string",
                "description": "Unidade de medida (unidade, peça, kit, lote, conjunto)"
            },
            "explanation": {
                "type": "string",
                "description": "Onde e como a quantidade foi encontrada"
            }
        },
        "required": ["total_quantity", "unit"]
    })
}

pub fn justification_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "justification": {
                "type": "string",
                "description": "Justificativa da decisão de relevância, em português"
            }
        },
        "required": ["justification"]
    })
}

// =============================================================================
// User Prompt Builders
// =============================================================================

pub fn summary_user(content: &str) -> String {
    format!("Gere o resumo estruturado do edital a seguir.\n\nDOCUMENTO:\n{content}")
}

/// The target stage reasons over the summary, never the raw corpus.
pub fn target_user(target: &str, summary: &str) -> String {
    format!(
        "Determine se o edital a seguir é relevante para o alvo '{target}'.\n\nRESUMO DO EDITAL:\n{summary}"
    )
}

pub fn quantity_user(target: &str, chunk_index: usize, chunk_total: usize, chunk: &str) -> String {
    format!(
        "Identifique a quantidade total de '{target}' no trecho {n} de {total} do edital.\n\nTRECHO:\n{chunk}",
        n = chunk_index + 1,
        total = chunk_total,
    )
}

pub fn justification_user(
    target: &str,
    threshold: u64,
    target_match: bool,
    is_relevant: bool,
    threshold_summary: &str,
    summary: &str,
) -> String {
    let decision = if is_relevant {
        "relevante"
    } else {
        "não relevante"
    };
    format!(
        "Gere a justificativa para a decisão de relevância do edital.\n\n\
         Alvo: {target}\n\
         Volume mínimo exigido: {threshold}\n\
         Relevante para o alvo: {target_match}\n\
         Análise de quantidade: {threshold_summary}\n\
         Decisão final: {decision}\n\n\
         RESUMO DO EDITAL:\n{summary}"
    )
}
