//! Landing page template catalog
//!
//! Templates are fixed at compile time and grouped by objective. The first
//! template of each objective is the default used when a page references a
//! template id that no longer exists.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::config::{ConsultantPersona, Content, FaqItem, Feature, Step};
use super::Objective;

/// A page template with its seed content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Thumbnail path relative to the frontend asset root
    pub thumbnail_ref: String,
    pub default_content: Content,
}

static CLIENT_TEMPLATES: OnceLock<Vec<Template>> = OnceLock::new();
static CONSULTANT_TEMPLATES: OnceLock<Vec<Template>> = OnceLock::new();

/// Ordered templates for an objective
pub fn templates(objective: Objective) -> &'static [Template] {
    match objective {
        Objective::Client => CLIENT_TEMPLATES.get_or_init(client_templates),
        Objective::Consultant => CONSULTANT_TEMPLATES.get_or_init(consultant_templates),
    }
}

/// String-keyed lookup; unknown objectives have no templates
pub fn templates_for(objective: &str) -> &'static [Template] {
    match Objective::parse(objective) {
        Some(objective) => templates(objective),
        None => &[],
    }
}

pub fn find_template(objective: Objective, template_id: &str) -> Option<&'static Template> {
    templates(objective).iter().find(|t| t.id == template_id)
}

/// Seed content for a template, falling back to the objective's first one
pub fn default_content(objective: Objective, template_id: &str) -> Content {
    find_template(objective, template_id)
        .or_else(|| templates(objective).first())
        .map(|t| t.default_content.clone())
        .unwrap_or_default()
}

fn feature(title: &str, description: &str, icon: &str) -> Feature {
    Feature {
        title: title.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
    }
}

fn step(title: &str, description: &str) -> Step {
    Step {
        title: title.to_string(),
        description: description.to_string(),
    }
}

fn faq(question: &str, answer: &str) -> FaqItem {
    FaqItem {
        question: question.to_string(),
        answer: answer.to_string(),
    }
}

fn client_templates() -> Vec<Template> {
    vec![
        Template {
            id: "essencial".to_string(),
            name: "Essencial".to_string(),
            description: "Página direta com chamada para contato pelo WhatsApp".to_string(),
            thumbnail_ref: "templates/client/essencial.png".to_string(),
            default_content: Content {
                headline: "Transforme sua rotina com a solução certa".to_string(),
                subheadline: "Atendimento personalizado do início ao fim".to_string(),
                video_url: String::new(),
                cta_text: "Quero saber mais".to_string(),
                features: vec![
                    feature("Atendimento próximo", "Fale direto com quem entende do assunto", "chat"),
                    feature("Resultados reais", "Acompanhamento até você atingir seus objetivos", "trophy"),
                    feature("Sem complicação", "Processo simples e transparente", "check"),
                ],
                how_it_works: vec![
                    step("Cadastre-se", "Deixe seu nome e contato"),
                    step("Conversamos", "Entendemos sua necessidade"),
                    step("Comece", "Você recebe tudo pronto para usar"),
                ],
                faq: vec![faq(
                    "Preciso pagar algo para conversar?",
                    "Não. O primeiro contato é gratuito e sem compromisso.",
                )],
                consultant: ConsultantPersona::default(),
            },
        },
        Template {
            id: "video".to_string(),
            name: "Vídeo em destaque".to_string(),
            description: "Apresentação em vídeo seguida dos benefícios".to_string(),
            thumbnail_ref: "templates/client/video.png".to_string(),
            default_content: Content {
                headline: "Veja como funciona em 2 minutos".to_string(),
                subheadline: "Assista ao vídeo e descubra por que tanta gente já mudou".to_string(),
                video_url: String::new(),
                cta_text: "Falar com um especialista".to_string(),
                features: vec![
                    feature("Explicação rápida", "Tudo o que você precisa saber em um vídeo", "play"),
                    feature("Suporte dedicado", "Tire dúvidas diretamente pelo WhatsApp", "chat"),
                ],
                how_it_works: vec![
                    step("Assista", "Conheça a proposta no vídeo"),
                    step("Pergunte", "Envie suas dúvidas"),
                ],
                faq: Vec::new(),
                consultant: ConsultantPersona::default(),
            },
        },
    ]
}

fn consultant_templates() -> Vec<Template> {
    vec![
        Template {
            id: "oportunidade".to_string(),
            name: "Oportunidade".to_string(),
            description: "Apresenta o modelo de negócio para novos consultores".to_string(),
            thumbnail_ref: "templates/consultant/oportunidade.png".to_string(),
            default_content: Content {
                headline: "Seja um consultor e construa sua própria renda".to_string(),
                subheadline: "Treinamento completo e suporte para você começar hoje".to_string(),
                video_url: String::new(),
                cta_text: "Quero ser consultor".to_string(),
                features: vec![
                    feature("Horário flexível", "Trabalhe quando e onde quiser", "clock"),
                    feature("Treinamentos", "Acesso a cursos exclusivos da rede", "book"),
                    feature("Comunidade", "Apoio de consultores experientes", "users"),
                ],
                how_it_works: vec![
                    step("Inscreva-se", "Preencha seus dados"),
                    step("Capacite-se", "Conclua os treinamentos iniciais"),
                    step("Venda", "Comece a atender seus clientes"),
                ],
                faq: vec![faq(
                    "Preciso de experiência?",
                    "Não. Os treinamentos cobrem tudo o que você precisa para começar.",
                )],
                consultant: ConsultantPersona {
                    role: "Consultor(a) independente".to_string(),
                    ..ConsultantPersona::default()
                },
            },
        },
        Template {
            id: "mentor".to_string(),
            name: "Mentoria".to_string(),
            description: "Destaca o consultor como mentor da equipe".to_string(),
            thumbnail_ref: "templates/consultant/mentor.png".to_string(),
            default_content: Content {
                headline: "Entre para o meu time".to_string(),
                subheadline: "Eu acompanho você em cada etapa".to_string(),
                video_url: String::new(),
                cta_text: "Fale comigo".to_string(),
                features: vec![
                    feature("Mentoria individual", "Encontros para planejar seu crescimento", "star"),
                    feature("Material pronto", "Divulgação e roteiros de venda", "folder"),
                ],
                how_it_works: vec![
                    step("Converse comigo", "Entenda como funciona"),
                    step("Comece", "Receba seu plano de ação"),
                ],
                faq: Vec::new(),
                consultant: ConsultantPersona {
                    role: "Líder de equipe".to_string(),
                    message: "Vou te ajudar a dar os primeiros passos.".to_string(),
                    ..ConsultantPersona::default()
                },
            },
        },
    ]
}
