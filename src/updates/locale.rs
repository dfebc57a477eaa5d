use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Ru,
}

pub struct UpdateTexts {
    pub update_title: &'static str,
    pub force_update_title: &'static str,
    pub force_update_message: &'static str,
    pub release_notes: &'static str,
}

const EN: UpdateTexts = UpdateTexts {
    update_title: "Update Available",
    force_update_title: "Required Update",
    force_update_message: "Update required to continue using the app",
    release_notes: "Bug fixes and improvements",
};

const RU: UpdateTexts = UpdateTexts {
    update_title: "Доступно обновление",
    force_update_title: "Обязательное обновление",
    force_update_message: "Требуется обновление для продолжения работы",
    release_notes: "Исправления ошибок и улучшения",
};

impl Locale {
    /// Picks `ru` when any listed language starts with "ru", `en` otherwise.
    /// Quality weights are ignored.
    pub fn from_accept_language(header: Option<&str>) -> Self {
        let header = header.unwrap_or("en");
        let russian = header
            .split(',')
            .filter_map(|lang| lang.trim().split(';').next())
            .any(|lang| lang.trim().to_lowercase().starts_with("ru"));

        if russian {
            Locale::Ru
        } else {
            Locale::En
        }
    }

    pub fn texts(self) -> &'static UpdateTexts {
        match self {
            Locale::En => &EN,
            Locale::Ru => &RU,
        }
    }
}
