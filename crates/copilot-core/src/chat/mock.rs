use crate::models::{Chat, Message, QuickAction};

pub fn chats() -> Vec<Chat> {
    vec![
        Chat::new("Финансовая аналитика", "10:30"),
        Chat::new("Проверка платежей", "Вчера"),
        Chat::new("Маркетинговая кампания", "2 дня назад"),
    ]
}

pub fn messages() -> Vec<Message> {
    vec![
        Message::answer(
            "Добрый день! Я Alfa Copilot — ваш AI-помощник для бизнеса. Чем могу помочь?",
        ),
        Message::query("Покажи финансовую аналитику за последний квартал"),
        Message::answer(
            "Анализирую данные за Q3 2024... Ваша выручка выросла на 23% по сравнению \
             с предыдущим кварталом. Основной рост в сегменте B2B",
        ),
    ]
}

pub fn quick_actions() -> Vec<QuickAction> {
    vec![
        QuickAction::new("Финансовая аналитика", "Аналитика финансовых показателей"),
        QuickAction::new("Шаблоны маркетинга", "Готовые маркетинг-решения"),
        QuickAction::new("Правовые документы", "Юридическая поддержка"),
    ]
}
